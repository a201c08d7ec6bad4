//! HTTP transport port definition.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use crate::domain::errors::NetworkError;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status code.
    pub status: u16,
    /// Full response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a 200 response.
    #[must_use]
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    /// Returns true for any 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Port for plain HTTP GET requests.
/// Implementations must be thread-safe.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs a GET request and buffers the body.
    async fn get(&self, url: &Url) -> Result<HttpResponse, NetworkError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    type Scripted = Result<HttpResponse, NetworkError>;

    /// Scripted HTTP client for testing.
    ///
    /// Queued responses are served first, then responses routed by URL path,
    /// then 404. A gated client holds every request until `release` is called.
    #[derive(Default)]
    pub struct MockHttpClient {
        queued: Mutex<VecDeque<Scripted>>,
        routes: Mutex<HashMap<String, Scripted>>,
        requests: Mutex<Vec<Url>>,
        gate: Option<Arc<Semaphore>>,
        outstanding: AtomicUsize,
        max_outstanding: AtomicUsize,
    }

    impl MockHttpClient {
        /// Creates a client that answers immediately.
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a client whose requests wait for `release`.
        pub fn gated() -> Self {
            Self {
                gate: Some(Arc::new(Semaphore::new(0))),
                ..Self::default()
            }
        }

        /// Queues a response for the next request.
        pub fn enqueue(&self, response: Scripted) {
            self.queued.lock().push_back(response);
        }

        /// Serves `response` for every request to `path`.
        pub fn route(&self, path: &str, response: Scripted) {
            self.routes.lock().insert(path.to_string(), response);
        }

        /// Lets `count` held requests complete.
        pub fn release(&self, count: usize) {
            if let Some(gate) = &self.gate {
                gate.add_permits(count);
            }
        }

        /// Returns how many requests were issued.
        pub fn call_count(&self) -> usize {
            self.requests.lock().len()
        }

        /// Returns every requested URL in order.
        pub fn requests(&self) -> Vec<Url> {
            self.requests.lock().clone()
        }

        /// Returns the highest number of simultaneously outstanding requests.
        pub fn max_outstanding(&self) -> usize {
            self.max_outstanding.load(Ordering::SeqCst)
        }

        fn respond(&self, url: &Url) -> Scripted {
            if let Some(response) = self.queued.lock().pop_front() {
                return response;
            }
            self.routes
                .lock()
                .get(url.path())
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, Bytes::new())))
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &Url) -> Result<HttpResponse, NetworkError> {
            self.requests.lock().push(url.clone());
            let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_outstanding.fetch_max(now, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            let response = self.respond(url);
            self.outstanding.fetch_sub(1, Ordering::SeqCst);
            response
        }
    }
}
