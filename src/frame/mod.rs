mod processor;
mod types;

pub use processor::FrameDecoder;
pub use types::Frame;
