//! Headless gallery driver.
//!
//! Plays the part of the grid view: it owns the event loop completions are
//! marshaled onto, scrolls through items one cell at a time, shows a
//! placeholder before each image request and drops results for cells that
//! have scrolled out of the viewport.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, trace, warn};

use crate::application::{
    FetchCoordinator, GalleryController, GalleryEvent, ListingEndpoint, PageSource,
};
use crate::domain::ports::{HttpClient, ImageDecoder, ViewNotifier};
use crate::infrastructure::config::GallerySettings;
use crate::infrastructure::image::{CacheStats, ImageCache};

/// Page failures in a row after which the driver gives up.
const MAX_CONSECUTIVE_PAGE_FAILURES: usize = 3;

/// Scrolling behaviour of the simulated grid.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Stop after this many cells have been displayed.
    pub max_items: usize,
    /// Number of cells visible at once.
    pub viewport_size: usize,
    /// Delay between two scroll steps.
    pub scroll_interval: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            max_items: 60,
            viewport_size: 12,
            scroll_interval: Duration::from_millis(50),
        }
    }
}

/// Outcome of a driver run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Items known to the gallery at exit.
    pub items_loaded: usize,
    /// Cells displayed.
    pub cells_displayed: usize,
    /// Images drawn into a visible cell.
    pub images_rendered: usize,
    /// Images that arrived after their cell scrolled away.
    pub images_discarded: usize,
    /// Images that failed to load.
    pub images_failed: usize,
    /// Page requests that failed.
    pub page_failures: usize,
    /// Cache statistics at exit.
    pub cache: CacheStats,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} items, {} cells shown, {} images rendered, {} discarded, {} failed, {} page failures. {}",
            self.items_loaded,
            self.cells_displayed,
            self.images_rendered,
            self.images_discarded,
            self.images_failed,
            self.page_failures,
            self.cache
        )
    }
}

#[derive(Debug)]
struct CellImage {
    index: usize,
    width: u32,
    height: u32,
}

/// Headless application driving a [`GalleryController`].
pub struct App {
    controller: GalleryController,
    gallery_rx: mpsc::UnboundedReceiver<GalleryEvent>,
    cell_tx: mpsc::UnboundedSender<CellImage>,
    cell_rx: mpsc::UnboundedReceiver<CellImage>,
    options: DriverOptions,
    next_cell: usize,
    images_requested: usize,
    images_rendered: usize,
    images_discarded: usize,
    images_failed: usize,
    page_failures: usize,
    consecutive_page_failures: usize,
}

impl App {
    /// Wires the gallery engine from validated settings and collaborators.
    #[must_use]
    pub fn new(
        settings: &GallerySettings,
        http: Arc<dyn HttpClient>,
        decoder: Arc<dyn ImageDecoder>,
        notifier: Arc<dyn ViewNotifier>,
        options: DriverOptions,
    ) -> Self {
        let endpoint = ListingEndpoint {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            order_by: settings.order_by.clone(),
        };
        let page_source = PageSource::new(
            http.clone(),
            endpoint,
            settings.first_page,
            settings.total_pages,
        );
        let cache = Arc::new(ImageCache::new(settings.cache_capacity));
        let coordinator = FetchCoordinator::new(cache, http, decoder);

        let (gallery_tx, gallery_rx) = mpsc::unbounded_channel();
        let controller = GalleryController::new(page_source, coordinator, notifier, &gallery_tx);
        let (cell_tx, cell_rx) = mpsc::unbounded_channel();

        Self {
            controller,
            gallery_rx,
            cell_tx,
            cell_rx,
            options,
            next_cell: 0,
            images_requested: 0,
            images_rendered: 0,
            images_discarded: 0,
            images_failed: 0,
            page_failures: 0,
            consecutive_page_failures: 0,
        }
    }

    /// Runs until enough cells were shown or the listing is exhausted, then
    /// waits for outstanding images.
    pub async fn run(mut self) -> RunSummary {
        info!(max_items = self.options.max_items, "Gallery appearing");
        self.controller.on_appear();

        let mut scroll = interval(self.options.scroll_interval);
        scroll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.is_finished() {
            tokio::select! {
                biased;

                Some(event) = self.gallery_rx.recv() => {
                    self.handle_gallery_event(event);
                }

                Some(cell) = self.cell_rx.recv() => {
                    self.handle_cell_image(&cell);
                }

                _ = scroll.tick() => {
                    self.scroll_step();
                }
            }
        }

        let summary = self.summary();
        info!(%summary, "Gallery run finished");
        summary
    }

    fn handle_gallery_event(&mut self, event: GalleryEvent) {
        match &event {
            GalleryEvent::PageLoaded(Ok(_)) => self.consecutive_page_failures = 0,
            GalleryEvent::PageLoaded(Err(_)) => {
                self.page_failures += 1;
                self.consecutive_page_failures += 1;
            }
            GalleryEvent::ImageFailed { .. } => self.images_failed += 1,
        }
        self.controller.handle_event(event);
    }

    fn handle_cell_image(&mut self, cell: &CellImage) {
        if cell.index < self.viewport_top() {
            trace!(index = cell.index, "Cell reused, dropping late image");
            self.images_discarded += 1;
        } else {
            trace!(index = cell.index, width = cell.width, height = cell.height, "Image drawn");
            self.images_rendered += 1;
        }
    }

    fn scroll_step(&mut self) {
        let known = self.controller.state().items().len();

        if self.next_cell < known && self.next_cell < self.options.max_items {
            self.display_cell(self.next_cell);
            self.next_cell += 1;
            return;
        }

        // Stuck at the bottom of the grid: pull again.
        let state = self.controller.state();
        if self.next_cell >= known
            && state.has_more_pages()
            && !state.is_loading_next_page()
            && self.consecutive_page_failures < MAX_CONSECUTIVE_PAGE_FAILURES
        {
            if known == 0 {
                self.controller.on_refresh();
            } else {
                self.controller.on_item_will_display(known - 1);
            }
        }
    }

    fn display_cell(&mut self, index: usize) {
        trace!(index, "Showing placeholder");

        let tx = self.cell_tx.clone();
        match self.controller.image_for(index, move |image| {
            let _ = tx.send(CellImage {
                index,
                width: image.width(),
                height: image.height(),
            });
        }) {
            Ok(outcome) => {
                self.images_requested += 1;
                debug!(index, ?outcome, "Image requested");
            }
            Err(e) => warn!(error = %e, "Cell has no item"),
        }

        self.controller.on_item_will_display(index);
    }

    fn viewport_top(&self) -> usize {
        self.next_cell.saturating_sub(self.options.viewport_size)
    }

    fn images_pending(&self) -> usize {
        self.images_requested
            - (self.images_rendered + self.images_discarded + self.images_failed)
    }

    fn is_finished(&self) -> bool {
        let state = self.controller.state();
        let known = state.items().len();
        let scrolled_enough = self.next_cell >= self.options.max_items;
        let at_bottom = self.next_cell >= known && !state.is_loading_next_page();
        let nothing_more = at_bottom
            && (!state.has_more_pages()
                || self.consecutive_page_failures >= MAX_CONSECUTIVE_PAGE_FAILURES);

        (scrolled_enough || nothing_more) && self.images_pending() == 0
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            items_loaded: self.controller.state().items().len(),
            cells_displayed: self.next_cell,
            images_rendered: self.images_rendered,
            images_discarded: self.images_discarded,
            images_failed: self.images_failed,
            page_failures: self.page_failures,
            cache: self.controller.cache_stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ApiKey;
    use crate::domain::ports::HttpResponse;
    use crate::domain::ports::mocks::{MockHttpClient, MockImageDecoder};
    use crate::presentation::LogViewNotifier;
    use reqwest::Url;

    fn settings(total_pages: u32) -> GallerySettings {
        GallerySettings {
            base_url: Url::parse("https://listing.example.com/photos").unwrap(),
            api_key: ApiKey::new("key").unwrap(),
            order_by: "latest".to_string(),
            total_pages,
            first_page: 1,
            cache_capacity: 1 << 20,
            timeout: Duration::from_secs(1),
            user_agent: "test".to_string(),
        }
    }

    fn listing(first: usize, count: usize) -> HttpResponse {
        let elements: Vec<serde_json::Value> = (first..first + count)
            .map(|n| serde_json::json!({ "urls": { "regular": format!("https://img.example.com/{n}") } }))
            .collect();
        HttpResponse::ok(serde_json::Value::Array(elements).to_string())
    }

    fn options(max_items: usize) -> DriverOptions {
        DriverOptions {
            max_items,
            viewport_size: 100,
            scroll_interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_scrolls_across_pages() {
        // Scrolling stops at page 2 of 3; both pages list the same four photos.
        let http = Arc::new(MockHttpClient::new());
        http.route("/photos", Ok(listing(0, 4)));
        for n in 0..4 {
            http.route(&format!("/{n}"), Ok(HttpResponse::ok("2x2")));
        }
        let notifier = Arc::new(LogViewNotifier::new());
        let app = App::new(
            &settings(3),
            http.clone(),
            Arc::new(MockImageDecoder::new()),
            notifier.clone(),
            options(100),
        );

        let summary = tokio::time::timeout(Duration::from_secs(10), app.run())
            .await
            .expect("driver did not finish");

        assert_eq!(summary.items_loaded, 8);
        assert_eq!(summary.cells_displayed, 8);
        assert_eq!(summary.images_rendered, 8);
        assert_eq!(summary.images_failed, 0);
        assert_eq!(notifier.renders(), 2);
        // Two listing requests plus one per distinct image.
        assert_eq!(http.call_count(), 6);
    }

    #[tokio::test]
    async fn test_stops_at_max_items() {
        let http = Arc::new(MockHttpClient::new());
        http.route("/photos", Ok(listing(0, 5)));
        for n in 0..5 {
            http.route(&format!("/{n}"), Ok(HttpResponse::ok("1x1")));
        }
        let app = App::new(
            &settings(100),
            http.clone(),
            Arc::new(MockImageDecoder::new()),
            Arc::new(LogViewNotifier::new()),
            options(3),
        );

        let summary = tokio::time::timeout(Duration::from_secs(10), app.run())
            .await
            .expect("driver did not finish");

        assert_eq!(summary.cells_displayed, 3);
        assert_eq!(summary.images_rendered, 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_repeated_page_failures() {
        let http = Arc::new(MockHttpClient::new());
        http.route("/photos", Ok(HttpResponse::new(503, "")));
        let notifier = Arc::new(LogViewNotifier::new());
        let app = App::new(
            &settings(10),
            http.clone(),
            Arc::new(MockImageDecoder::new()),
            notifier.clone(),
            options(10),
        );

        let summary = tokio::time::timeout(Duration::from_secs(10), app.run())
            .await
            .expect("driver did not finish");

        assert_eq!(summary.items_loaded, 0);
        assert_eq!(summary.page_failures, MAX_CONSECUTIVE_PAGE_FAILURES);
        assert_eq!(notifier.errors(), MAX_CONSECUTIVE_PAGE_FAILURES);
    }

    #[tokio::test]
    async fn test_failed_images_are_counted() {
        let http = Arc::new(MockHttpClient::new());
        http.enqueue(Ok(listing(0, 2)));
        http.route("/0", Ok(HttpResponse::ok("3x3")));
        http.route("/1", Ok(HttpResponse::new(404, "")));
        let app = App::new(
            &settings(1),
            http.clone(),
            Arc::new(MockImageDecoder::new()),
            Arc::new(LogViewNotifier::new()),
            options(10),
        );

        let summary = tokio::time::timeout(Duration::from_secs(10), app.run())
            .await
            .expect("driver did not finish");

        assert_eq!(summary.images_rendered, 1);
        assert_eq!(summary.images_failed, 1);
    }
}
