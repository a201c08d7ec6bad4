//! Controller misuse errors.

use thiserror::Error;

/// Errors returned to the view when it asks for something the gallery does not hold.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GalleryError {
    #[error("item index {index} out of range (gallery holds {len} items)")]
    IndexOutOfRange { index: usize, len: usize },
}
