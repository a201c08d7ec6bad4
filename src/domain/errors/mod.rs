//! Domain error types.

mod fetch_error;
mod gallery_error;

pub use fetch_error::{DecodeError, ErrorKind, FetchError, NetworkError};
pub use gallery_error::GalleryError;
