//! Gallery orchestration: page triggers, image resolution, state ownership.

use std::sync::Arc;

use image::DynamicImage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::services::{FetchCoordinator, PageSource, RequestOutcome};
use crate::domain::entities::{GalleryState, ImageKey, Page};
use crate::domain::errors::{FetchError, GalleryError};
use crate::domain::ports::ViewNotifier;
use crate::infrastructure::image::CacheStats;

/// Completion marshaled back onto the task that owns the controller.
#[derive(Debug)]
pub enum GalleryEvent {
    /// A page request finished.
    PageLoaded(Result<Page, FetchError>),
    /// An image requested through [`GalleryController::image_for`] failed.
    ImageFailed {
        /// Index the image was requested for.
        index: usize,
        /// Key of the failed image.
        key: ImageKey,
        /// Failure reason.
        error: FetchError,
    },
}

/// Owns the gallery state and drives pagination and image loading.
///
/// Every method must be called from the single task that also drains the
/// event channel and feeds it to [`handle_event`](Self::handle_event).
pub struct GalleryController {
    state: GalleryState,
    page_source: PageSource,
    coordinator: FetchCoordinator,
    notifier: Arc<dyn ViewNotifier>,
    event_tx: mpsc::UnboundedSender<GalleryEvent>,
    pending_pages: usize,
}

impl std::fmt::Debug for GalleryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryController")
            .field("state", &self.state)
            .field("pending_pages", &self.pending_pages)
            .finish_non_exhaustive()
    }
}

impl GalleryController {
    /// Creates a controller. Completions are sent through `event_tx`.
    #[must_use]
    pub fn new(
        page_source: PageSource,
        coordinator: FetchCoordinator,
        notifier: Arc<dyn ViewNotifier>,
        event_tx: &mpsc::UnboundedSender<GalleryEvent>,
    ) -> Self {
        let state = GalleryState::new(page_source.current_page(), page_source.total_pages());
        Self {
            state,
            page_source,
            coordinator,
            notifier,
            event_tx: event_tx.clone(),
            pending_pages: 0,
        }
    }

    /// Returns the current gallery state.
    #[must_use]
    pub const fn state(&self) -> &GalleryState {
        &self.state
    }

    /// Returns image cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.coordinator.cache().stats()
    }

    /// Loads the first page. Returns true if a request was issued.
    pub fn on_appear(&mut self) -> bool {
        self.request_page("appear")
    }

    /// Prefetches the next page when the last known item is about to be shown.
    /// Returns true if a request was issued.
    pub fn on_item_will_display(&mut self, index: usize) -> bool {
        if !self.state.is_last_index(index)
            || !self.state.has_more_pages()
            || self.state.is_loading_next_page()
        {
            return false;
        }
        self.request_page("scroll")
    }

    /// Pull-to-refresh: requests a page regardless of the loading flag.
    /// Still a no-op while a page request is on the wire.
    pub fn on_refresh(&mut self) -> bool {
        self.request_page("refresh")
    }

    /// Resolves the image for `index`.
    ///
    /// On a cache hit `on_ready` runs before this returns; otherwise it runs
    /// on a worker task when the fetch succeeds. Failures come back as
    /// [`GalleryEvent::ImageFailed`].
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` if no item exists at `index`.
    pub fn image_for<F>(&self, index: usize, on_ready: F) -> Result<RequestOutcome, GalleryError>
    where
        F: FnOnce(Arc<DynamicImage>) + Send + 'static,
    {
        let item = self
            .state
            .items()
            .get(index)
            .ok_or(GalleryError::IndexOutOfRange {
                index,
                len: self.state.items().len(),
            })?;

        let key = item.key();
        let failed_key = key.clone();
        let tx = self.event_tx.clone();
        let outcome =
            self.coordinator
                .request_image(key, item.source_url().clone(), move |result| match result {
                    Ok(image) => on_ready(image),
                    Err(error) => {
                        let event = GalleryEvent::ImageFailed {
                            index,
                            key: failed_key,
                            error,
                        };
                        if tx.send(event).is_err() {
                            debug!(index, "Gallery closed before image failure arrived");
                        }
                    }
                });
        Ok(outcome)
    }

    /// Applies a marshaled completion to the state and notifies the view.
    pub fn handle_event(&mut self, event: GalleryEvent) {
        match event {
            GalleryEvent::PageLoaded(result) => self.apply_page(result),
            GalleryEvent::ImageFailed { index, key, error } => {
                warn!(index, key = %key, error = %error, "Image unavailable");
                self.notifier.on_error(error.kind());
            }
        }
    }

    fn apply_page(&mut self, result: Result<Page, FetchError>) {
        self.pending_pages = self.pending_pages.saturating_sub(1);
        let still_loading = self.pending_pages > 0;

        match result {
            Ok(page) => {
                let added = page.items.len();
                self.state.append(page.items);
                self.state.advance_to(self.page_source.current_page());
                self.state.set_loading(still_loading);
                info!(
                    page = page.number,
                    added,
                    total = self.state.items().len(),
                    "Gallery updated"
                );
                self.notifier.on_items_changed();
                if !still_loading {
                    self.notifier.on_loading_state_changed(false);
                }
            }
            Err(error) => {
                self.state.set_loading(still_loading);
                warn!(error = %error, page = self.state.current_page(), "Page not loaded");
                if !still_loading {
                    self.notifier.on_loading_state_changed(false);
                }
                self.notifier.on_error(error.kind());
            }
        }
    }

    fn request_page(&mut self, trigger: &'static str) -> bool {
        let request = match self.page_source.fetch_next_page() {
            Ok(request) => request,
            Err(reason) => {
                debug!(trigger, reason = %reason, "Page request not issued");
                return false;
            }
        };

        debug!(trigger, page = request.page(), "Requesting page");
        self.pending_pages += 1;
        if !self.state.is_loading_next_page() {
            self.state.set_loading(true);
            self.notifier.on_loading_state_changed(true);
        }

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = request.run().await;
            if tx.send(GalleryEvent::PageLoaded(result)).is_err() {
                debug!("Gallery closed before page arrived");
            }
        });
        true
    }
}
