use chrono::{DateTime, Local};
use image::RgbImage;
use std::fmt;

/// A decoded camera frame: 8-bit RGB, channels in R, G, B order.
#[derive(Clone)]
pub struct Frame {
    pub data: RgbImage,
    pub width: u32,
    pub height: u32,
    /// Position of this frame within its connection, starting at 0
    pub nframe: u64,
    pub received_at: DateTime<Local>,
}

impl Frame {
    pub fn new(data: RgbImage, nframe: u64) -> Self {
        let (width, height) = data.dimensions();
        Self {
            data,
            width,
            height,
            nframe,
            received_at: Local::now(),
        }
    }

    /// Raw interleaved pixel bytes, `width * height * 3` long.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_raw()
    }

    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("nframe", &self.nframe)
            .field("received_at", &self.received_at)
            .finish()
    }
}
