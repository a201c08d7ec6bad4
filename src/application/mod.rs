//! Application layer: pagination, fetch coordination and gallery orchestration.

/// Gallery controller and its event type.
pub mod gallery_controller;
/// Page source and fetch coordinator.
pub mod services;

pub use gallery_controller::{GalleryController, GalleryEvent};
pub use services::{FetchCoordinator, ListingEndpoint, PageSource, RequestOutcome};
