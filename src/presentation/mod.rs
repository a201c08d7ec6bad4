//! Presentation layer: the headless driver and view notifier.

/// Headless gallery driver.
pub mod app;
/// Tracing-backed view notifier.
pub mod notifier;

pub use app::{App, DriverOptions, RunSummary};
pub use notifier::LogViewNotifier;
