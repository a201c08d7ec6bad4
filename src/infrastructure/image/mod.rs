//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with cost-bounded LRU eviction
//! - Decoding through the `image` crate

pub mod decoder;
pub mod memory_cache;

pub use decoder::ImageRsDecoder;
pub use memory_cache::{CacheStats, DEFAULT_CAPACITY_BYTES, ImageCache};
