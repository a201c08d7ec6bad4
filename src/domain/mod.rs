//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{ApiKey, GalleryState, ImageKey, ImageRef, Page};
pub use errors::{DecodeError, ErrorKind, FetchError, GalleryError, NetworkError};
pub use ports::{HttpClient, HttpResponse, ImageDecoder, ViewNotifier};
