//! Image decoding port definition.

use image::DynamicImage;

use crate::domain::errors::DecodeError;

/// Port turning downloaded bytes into an in-memory image.
/// Called from the blocking pool, so implementations may be CPU heavy.
pub trait ImageDecoder: Send + Sync {
    /// Decodes a complete image payload.
    ///
    /// # Errors
    /// Returns error if the bytes are not a supported image.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, DecodeError>;
}
