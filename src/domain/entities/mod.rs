//! Domain entity definitions.

mod api_key;
mod image_ref;
mod page;

pub use api_key::ApiKey;
pub use image_ref::{ImageKey, ImageRef};
pub use page::{GalleryState, Page};
