//! Core gallery services.

pub mod fetch_coordinator;
pub mod page_source;

pub use fetch_coordinator::{FetchCoordinator, ImageCallback, ImageResult, RequestOutcome};
pub use page_source::{ListingEndpoint, PageRequest, PageRequestRejected, PageSource, parse_listing};
