use super::types::MessageType;
use crate::error::{AppError, Result};

/// Size of the `[type][length]` header in bytes.
pub const HEADER_LEN: usize = 5;

/// One length-prefixed message as it travels over the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageType,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(kind: MessageType, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    /// Header followed by payload, ready for a single `write_all`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let header = encode_header(self.kind, self.payload.len())?;
        let mut buffer = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buffer.extend_from_slice(&header);
        buffer.extend_from_slice(&self.payload);
        Ok(buffer)
    }
}

pub fn encode_header(kind: MessageType, payload_len: usize) -> Result<[u8; HEADER_LEN]> {
    let length = u32::try_from(payload_len).map_err(|_| {
        AppError::protocol(format!(
            "payload of {} bytes does not fit a u32 length",
            payload_len
        ))
    })?;

    let mut header = [0u8; HEADER_LEN];
    header[0] = kind.as_u8();
    header[1..].copy_from_slice(&length.to_be_bytes());
    Ok(header)
}

pub fn decode_header(header: &[u8; HEADER_LEN]) -> (MessageType, u32) {
    let kind = MessageType::from_u8(header[0]);
    let length = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    (kind, length)
}

/// Wraps a serializable command as a COMMAND message.
pub fn encode_command<T: serde::Serialize + ?Sized>(command: &T) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(command)?;
    Message::new(MessageType::Command, payload).encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_layout_is_big_endian() {
        let header = encode_header(MessageType::Telemetry, 0x0102_0304).unwrap();
        assert_eq!(header, [0x02, 0x01, 0x02, 0x03, 0x04]);

        let (kind, length) = decode_header(&header);
        assert_eq!(kind, MessageType::Telemetry);
        assert_eq!(length, 0x0102_0304);
    }

    #[test]
    fn test_encode_empty_payload() {
        let bytes = Message::new(MessageType::Frame, Vec::new()).encode().unwrap();
        assert_eq!(bytes, vec![0x01, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_command() {
        let command = json!({"type": "set_resolution", "resolution": "1280x720"});
        let bytes = encode_command(&command).unwrap();

        assert_eq!(bytes[0], 0xFF);
        let (_, length) = decode_header(bytes[..HEADER_LEN].try_into().unwrap());
        assert_eq!(length as usize, bytes.len() - HEADER_LEN);

        let decoded: serde_json::Value = serde_json::from_slice(&bytes[HEADER_LEN..]).unwrap();
        assert_eq!(decoded, command);
    }
}
