//! reqwest-backed HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::domain::errors::NetworkError;
use crate::domain::ports::{HttpClient, HttpResponse};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default user agent header.
pub const USER_AGENT: &str = concat!("infinigallery/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP session used for both listing and image requests.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with default timeout and user agent.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, NetworkError> {
        Self::with_options(Duration::from_secs(DEFAULT_TIMEOUT_SECS), USER_AGENT)
    }

    /// Creates a client with a custom timeout and user agent.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::new(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

fn classify(err: &reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::timeout("request timed out")
    } else if err.is_connect() {
        NetworkError::new(format!("failed to connect: {err}"))
    } else {
        NetworkError::new(err.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, NetworkError> {
        debug!(host = url.host_str().unwrap_or_default(), path = url.path(), "GET");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(error = %e, "HTTP request failed");
            classify(&e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, status, "Failed to read response body");
            classify(&e)
        })?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = ReqwestHttpClient::with_options(Duration::from_secs(2), USER_AGENT).unwrap();
        let url = Url::parse("http://127.0.0.1:1/photos").unwrap();

        let result = client.get(&url).await;

        assert!(result.is_err());
    }
}
