//! Image decoding backed by the `image` crate.

use image::DynamicImage;

use crate::domain::errors::DecodeError;
use crate::domain::ports::ImageDecoder;

/// Decodes PNG, JPEG and WebP payloads, sniffing the format from the bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsDecoder;

impl ImageRsDecoder {
    /// Creates the decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ImageDecoder for ImageRsDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        image::load_from_memory(bytes).map_err(|e| DecodeError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decodes_png() {
        let mut encoded = Vec::new();
        DynamicImage::new_rgb8(3, 2)
            .write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
            .unwrap();

        let decoded = ImageRsDecoder::new().decode(&encoded).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn test_rejects_garbage() {
        let result = ImageRsDecoder::new().decode(b"<html>not an image</html>");
        assert!(result.is_err());
    }
}
