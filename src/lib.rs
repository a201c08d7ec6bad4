//! Infinigallery - an infinite-scroll image gallery engine.
//!
//! This crate pages through a remote photo listing, fetches and decodes
//! images with per-URL deduplication, keeps them in a cost-bounded memory
//! cache, and drives a grid view through a small notifier interface.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the gallery controller and its services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing the headless driver.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "infinigallery";
