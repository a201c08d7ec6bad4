//! Deduplicating image fetcher.
//!
//! At most one network request per key is outstanding at any time. Callers
//! that ask for a key while its fetch is running join the existing request
//! and are answered, in registration order, when it completes.

use std::collections::HashMap;
use std::sync::Arc;

use image::DynamicImage;
use parking_lot::Mutex;
use reqwest::Url;
use tracing::{debug, trace, warn};

use crate::domain::entities::ImageKey;
use crate::domain::errors::FetchError;
use crate::domain::ports::{HttpClient, ImageDecoder};
use crate::infrastructure::image::ImageCache;

/// Result delivered to image waiters.
pub type ImageResult = Result<Arc<DynamicImage>, FetchError>;

/// Completion callback for an image request.
pub type ImageCallback = Box<dyn FnOnce(ImageResult) + Send + 'static>;

/// How a request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Answered synchronously from the cache.
    Cached,
    /// Attached to a fetch that was already running.
    Joined,
    /// Started a new network fetch.
    Started,
}

#[derive(Default)]
struct InFlightFetch {
    waiters: Vec<ImageCallback>,
}

type InFlightMap = Arc<Mutex<HashMap<ImageKey, InFlightFetch>>>;

/// Coordinates image fetches against the cache and the network.
pub struct FetchCoordinator {
    cache: Arc<ImageCache>,
    http: Arc<dyn HttpClient>,
    decoder: Arc<dyn ImageDecoder>,
    in_flight: InFlightMap,
}

impl std::fmt::Debug for FetchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCoordinator")
            .field("cache", &self.cache)
            .field("in_flight", &self.in_flight_count())
            .finish_non_exhaustive()
    }
}

impl FetchCoordinator {
    /// Creates a coordinator over the given cache and collaborators.
    #[must_use]
    pub fn new(
        cache: Arc<ImageCache>,
        http: Arc<dyn HttpClient>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        Self {
            cache,
            http,
            decoder,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cache this coordinator fills.
    #[must_use]
    pub const fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Requests the image stored under `key`, fetching it from `url` on a miss.
    ///
    /// A cache hit invokes `on_complete` before this method returns. Otherwise
    /// the callback runs on a worker task once the shared fetch resolves.
    /// Must be called from within a tokio runtime.
    pub fn request_image<F>(&self, key: ImageKey, url: Url, on_complete: F) -> RequestOutcome
    where
        F: FnOnce(ImageResult) + Send + 'static,
    {
        if let Some(image) = self.cache.get(&key) {
            on_complete(Ok(image));
            return RequestOutcome::Cached;
        }

        {
            let mut in_flight = self.in_flight.lock();
            if let Some(fetch) = in_flight.get_mut(&key) {
                fetch.waiters.push(Box::new(on_complete));
                trace!(key = %key, waiters = fetch.waiters.len(), "Joined in-flight fetch");
                return RequestOutcome::Joined;
            }
            in_flight.insert(
                key.clone(),
                InFlightFetch {
                    waiters: vec![Box::new(on_complete)],
                },
            );
        }

        debug!(key = %key, "Starting image fetch");
        let task = FetchTask {
            cache: self.cache.clone(),
            http: self.http.clone(),
            decoder: self.decoder.clone(),
            entry: InFlightGuard {
                in_flight: self.in_flight.clone(),
                key: Some(key.clone()),
            },
        };
        tokio::spawn(task.run(key, url));

        RequestOutcome::Started
    }

    /// Returns true while a fetch for `key` is outstanding.
    #[must_use]
    pub fn is_in_flight(&self, key: &ImageKey) -> bool {
        self.in_flight.lock().contains_key(key)
    }

    /// Returns the number of outstanding fetches.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

/// State moved into a spawned fetch.
struct FetchTask {
    cache: Arc<ImageCache>,
    http: Arc<dyn HttpClient>,
    decoder: Arc<dyn ImageDecoder>,
    entry: InFlightGuard,
}

impl FetchTask {
    async fn run(self, key: ImageKey, url: Url) {
        let result = self.fetch(&url).await;

        match &result {
            Ok(image) => {
                self.cache
                    .put(key.clone(), image.clone(), ImageCache::cost_of(image));
            }
            Err(e) => warn!(key = %key, error = %e, "Image fetch failed"),
        }

        self.entry.finish(&result);
    }

    async fn fetch(&self, url: &Url) -> ImageResult {
        let response = self.http.get(url).await?;

        if !response.is_success() {
            return Err(FetchError::status(response.status));
        }

        let decoder = self.decoder.clone();
        let body = response.body;
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&body))
            .await
            .map_err(|e| FetchError::decode(format!("decode task panicked: {e}")))??;

        Ok(Arc::new(decoded))
    }
}

/// Owns an in-flight entry until its waiters have been answered.
///
/// A guard dropped before `finish`, because the fetch task panicked or was
/// cancelled, answers every waiter with a network error.
struct InFlightGuard {
    in_flight: InFlightMap,
    key: Option<ImageKey>,
}

impl InFlightGuard {
    fn finish(mut self, result: &ImageResult) {
        if let Some(key) = self.key.take() {
            drain_waiters(&self.in_flight, &key, result);
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            warn!(key = %key, "Image fetch abandoned");
            drain_waiters(
                &self.in_flight,
                &key,
                &Err(FetchError::network("image fetch abandoned")),
            );
        }
    }
}

fn drain_waiters(in_flight: &InFlightMap, key: &ImageKey, result: &ImageResult) {
    // Entry removal and waiter hand-off happen under one lock so no late
    // joiner can slip in after the drain.
    let waiters = in_flight
        .lock()
        .remove(key)
        .map(|fetch| fetch.waiters)
        .unwrap_or_default();

    debug!(key = %key, waiters = waiters.len(), ok = result.is_ok(), "Image fetch finished");
    for waiter in waiters {
        waiter(result.clone());
    }
}
