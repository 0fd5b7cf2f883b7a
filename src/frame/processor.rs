use super::types::Frame;
use crate::error::{AppError, Result};
use log::trace;

pub struct FrameDecoder;

impl FrameDecoder {
    /// Decodes a compressed still image (JPEG in practice, any format the
    /// `image` crate recognises) into an RGB frame.
    pub fn decode(payload: &[u8], nframe: u64) -> Result<Frame> {
        if payload.is_empty() {
            return Err(AppError::frame_decode("empty payload"));
        }

        let image = image::load_from_memory(payload)?.to_rgb8();
        trace!(
            "Decoded frame {} ({}x{}, {} bytes compressed)",
            nframe,
            image.width(),
            image.height(),
            payload.len()
        );

        Ok(Frame::new(image, nframe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode(image: RgbImage, format: ImageOutputFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png_preserves_pixels() {
        let mut image = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        image.put_pixel(3, 1, Rgb([255, 0, 128]));

        let frame = FrameDecoder::decode(&encode(image, ImageOutputFormat::Png), 7).unwrap();
        assert_eq!(frame.width, 4);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.nframe, 7);
        assert_eq!(frame.as_bytes().len(), 4 * 2 * 3);
        assert_eq!(frame.data.get_pixel(0, 0), &Rgb([10, 20, 30]));
        assert_eq!(frame.data.get_pixel(3, 1), &Rgb([255, 0, 128]));
    }

    #[test]
    fn test_decode_jpeg() {
        let image = RgbImage::from_pixel(64, 48, Rgb([200, 200, 200]));
        let frame = FrameDecoder::decode(&encode(image, ImageOutputFormat::Jpeg(90)), 0).unwrap();
        assert_eq!(frame.resolution(), "64x48");
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = FrameDecoder::decode(b"definitely not an image", 0);
        assert!(matches!(result, Err(AppError::FrameDecode(_))));
    }

    #[test]
    fn test_decode_empty_fails() {
        assert!(FrameDecoder::decode(&[], 0).is_err());
    }
}
