//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// HTTP transport.
pub mod http;
/// Image handling (caching, decoding).
pub mod image;

pub use config::{AppConfig, CliArgs, ConfigError, ConfigStore, GallerySettings, LogLevel};
pub use http::ReqwestHttpClient;
pub use image::{CacheStats, ImageCache, ImageRsDecoder};
