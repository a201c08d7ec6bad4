//! Paginated listing client.

use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::entities::{ApiKey, ImageRef, Page};
use crate::domain::errors::FetchError;
use crate::domain::ports::HttpClient;

/// Query parameter carrying the page cursor. The listing API treats it as
/// the batch selector, not as a batch size.
const PAGE_PARAM: &str = "per_page";

/// Where and how to query the listing.
#[derive(Debug, Clone)]
pub struct ListingEndpoint {
    /// Listing URL without query.
    pub base_url: Url,
    /// Access key sent as `client_id`.
    pub api_key: ApiKey,
    /// Ordering criterion sent as `order_by`.
    pub order_by: String,
}

impl ListingEndpoint {
    /// Builds the request URL for `page`.
    #[must_use]
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", self.api_key.as_str())
            .append_pair("order_by", &self.order_by)
            .append_pair(PAGE_PARAM, &page.to_string());
        url
    }
}

/// Why a page request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestRejected {
    /// Another page request is outstanding.
    #[error("a page request is already in flight")]
    Busy,
    /// Every page up to the configured bound has been loaded.
    #[error("all pages have been loaded")]
    Exhausted,
}

#[derive(Debug)]
struct Cursor {
    next_page: u32,
    fetching: bool,
    exhausted: bool,
}

impl Cursor {
    fn is_exhausted(&self, total_pages: u32) -> bool {
        self.exhausted || self.next_page > total_pages
    }
}

/// Issues listing requests one page at a time.
///
/// The source is `Idle` or `Fetching`; while a [`PageRequest`] is alive it is
/// `Fetching` and further requests are refused. The cursor advances only when
/// a request succeeds.
pub struct PageSource {
    http: Arc<dyn HttpClient>,
    endpoint: ListingEndpoint,
    total_pages: u32,
    cursor: Arc<Mutex<Cursor>>,
}

impl std::fmt::Debug for PageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSource")
            .field("endpoint", &self.endpoint)
            .field("total_pages", &self.total_pages)
            .field("cursor", &*self.cursor.lock())
            .finish_non_exhaustive()
    }
}

impl PageSource {
    /// Creates a source starting at `first_page`.
    #[must_use]
    pub fn new(
        http: Arc<dyn HttpClient>,
        endpoint: ListingEndpoint,
        first_page: u32,
        total_pages: u32,
    ) -> Self {
        Self {
            http,
            endpoint,
            total_pages,
            cursor: Arc::new(Mutex::new(Cursor {
                next_page: first_page.max(1),
                fetching: false,
                exhausted: false,
            })),
        }
    }

    /// Returns the page the next request will ask for.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.cursor.lock().next_page
    }

    /// Returns the configured page bound.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Returns true while a request is outstanding.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.cursor.lock().fetching
    }

    /// Returns true if pages remain to be requested.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.cursor.lock().is_exhausted(self.total_pages)
    }

    /// Claims the next page.
    ///
    /// The returned request does nothing until [`PageRequest::run`] is awaited.
    ///
    /// # Errors
    /// Returns `Busy` if a request is outstanding, `Exhausted` if the cursor
    /// is past the last page.
    pub fn fetch_next_page(&self) -> Result<PageRequest, PageRequestRejected> {
        let mut cursor = self.cursor.lock();
        if cursor.fetching {
            return Err(PageRequestRejected::Busy);
        }
        if cursor.is_exhausted(self.total_pages) {
            return Err(PageRequestRejected::Exhausted);
        }
        cursor.fetching = true;
        let page = cursor.next_page;
        drop(cursor);

        debug!(page, "Claimed page request");
        Ok(PageRequest {
            http: self.http.clone(),
            url: self.endpoint.page_url(page),
            page,
            total_pages: self.total_pages,
            claim: Claim {
                cursor: self.cursor.clone(),
            },
        })
    }
}

/// Holds the `Fetching` state and releases it when dropped.
struct Claim {
    cursor: Arc<Mutex<Cursor>>,
}

impl Claim {
    fn complete(self, page: u32) {
        let mut cursor = self.cursor.lock();
        // The page after `u32::MAX` does not exist; stop there instead of wrapping.
        match page.checked_add(1) {
            Some(next) => cursor.next_page = cursor.next_page.max(next),
            None => cursor.exhausted = true,
        }
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.cursor.lock().fetching = false;
    }
}

/// A claimed, not yet executed page fetch.
pub struct PageRequest {
    http: Arc<dyn HttpClient>,
    url: Url,
    page: u32,
    total_pages: u32,
    claim: Claim,
}

impl std::fmt::Debug for PageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRequest")
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

impl PageRequest {
    /// Returns the page number being fetched.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Performs the request.
    ///
    /// # Errors
    /// Returns `FetchError` on network failure, a non-200 status, or a body
    /// that is not a JSON array of objects. The cursor is left unchanged.
    pub async fn run(self) -> Result<Page, FetchError> {
        let Self {
            http,
            url,
            page,
            total_pages,
            claim,
        } = self;

        let result = fetch_page(http.as_ref(), &url, page, total_pages).await;
        match &result {
            Ok(fetched) => {
                info!(page, items = fetched.items.len(), has_more = fetched.has_more, "Page loaded");
                claim.complete(page);
            }
            Err(e) => {
                warn!(page, error = %e, "Page fetch failed");
                drop(claim);
            }
        }
        result
    }
}

async fn fetch_page(
    http: &dyn HttpClient,
    url: &Url,
    page: u32,
    total_pages: u32,
) -> Result<Page, FetchError> {
    let response = http.get(url).await?;

    if response.status != 200 {
        return Err(FetchError::status(response.status));
    }

    Ok(Page {
        number: page,
        items: parse_listing(&response.body)?,
        has_more: page < total_pages,
    })
}

/// Parses a listing body into image references.
///
/// Elements without a usable `urls.regular` string are skipped.
///
/// # Errors
/// Returns a parse error unless the body is a JSON array of objects.
pub fn parse_listing(body: &[u8]) -> Result<Vec<ImageRef>, FetchError> {
    let elements: Vec<Map<String, Value>> = serde_json::from_slice(body)?;
    let total = elements.len();

    let items: Vec<ImageRef> = elements.iter().filter_map(image_ref_from).collect();
    if items.len() < total {
        debug!(skipped = total - items.len(), "Skipped listing elements without a regular URL");
    }
    Ok(items)
}

fn image_ref_from(element: &Map<String, Value>) -> Option<ImageRef> {
    let regular = element.get("urls")?.get("regular")?.as_str()?;
    let url = Url::parse(regular).ok()?;
    let id = element
        .get("id")
        .and_then(Value::as_str)
        .map_or_else(|| url.as_str().to_string(), str::to_string);
    Some(ImageRef::new(id, url))
}
