//! HTTP transport adapter.

pub mod client;

pub use client::{DEFAULT_TIMEOUT_SECS, ReqwestHttpClient, USER_AGENT};
