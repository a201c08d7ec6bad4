//! Listing pages and the gallery's externally visible state.

use super::ImageRef;

/// One batch of listing results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page number that was requested.
    pub number: u32,
    /// Image references parsed from the batch, in listing order.
    pub items: Vec<ImageRef>,
    /// Whether the listing has pages after this one.
    pub has_more: bool,
}

/// Gallery state owned by the controller.
///
/// `items` only grows and `current_page` never decreases within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryState {
    items: Vec<ImageRef>,
    current_page: u32,
    total_pages: u32,
    is_loading_next_page: bool,
}

impl GalleryState {
    /// Creates an empty state positioned at `first_page`.
    #[must_use]
    pub fn new(first_page: u32, total_pages: u32) -> Self {
        Self {
            items: Vec::new(),
            current_page: first_page.max(1),
            total_pages,
            is_loading_next_page: false,
        }
    }

    /// Returns every image reference loaded so far.
    #[must_use]
    pub fn items(&self) -> &[ImageRef] {
        &self.items
    }

    /// Returns the next page number the listing will be asked for.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Returns the configured page upper bound.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Returns true while a page fetch is outstanding.
    #[must_use]
    pub const fn is_loading_next_page(&self) -> bool {
        self.is_loading_next_page
    }

    /// Returns true if scrolling may still prefetch a page.
    #[must_use]
    pub const fn has_more_pages(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Returns true if `index` is the last item currently known.
    #[must_use]
    pub fn is_last_index(&self, index: usize) -> bool {
        !self.items.is_empty() && index == self.items.len() - 1
    }

    pub(crate) fn append(&mut self, items: Vec<ImageRef>) {
        self.items.extend(items);
    }

    pub(crate) fn advance_to(&mut self, page: u32) {
        self.current_page = self.current_page.max(page);
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.is_loading_next_page = loading;
    }
}
