//! Wire protocol shared with the controller board.
//!
//! Every message is `[1 byte type][4 bytes length, big-endian u32][payload]`.

mod codec;
mod reader;
mod types;

pub use codec::{decode_header, encode_command, encode_header, Message, HEADER_LEN};
pub use reader::{read_exact_or_eof, MessageReader, DEFAULT_MAX_PAYLOAD_LEN};
pub use types::MessageType;
