//! Port definitions for external collaborators.

mod http_client_port;
mod image_decoder_port;
mod view_notifier_port;

pub use http_client_port::{HttpClient, HttpResponse};
pub use image_decoder_port::ImageDecoder;
pub use view_notifier_port::ViewNotifier;
