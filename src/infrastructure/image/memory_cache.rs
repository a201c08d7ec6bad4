//! In-memory LRU image cache bounded by total cost.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::DynamicImage;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::ImageKey;

/// Default cache budget: 64 MiB of decoded pixels.
pub const DEFAULT_CAPACITY_BYTES: usize = 64 * 1024 * 1024;

struct CacheEntry {
    image: Arc<DynamicImage>,
    cost: usize,
}

struct Store {
    entries: LruCache<ImageKey, CacheEntry>,
    total_cost: usize,
}

/// In-memory cache for decoded images.
///
/// Entries are evicted least-recently-used first until the summed cost of
/// resident entries fits the capacity. An entry costing more than the whole
/// capacity is never stored, so a zero capacity always misses.
pub struct ImageCache {
    store: Mutex<Store>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ImageCache {
    /// Creates a new cache holding at most `capacity` cost units.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Mutex::new(Store {
                entries: LruCache::unbounded(),
                total_cost: 0,
            }),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY_BYTES)
    }

    /// Cost of keeping `image` resident: its decoded size in bytes.
    #[must_use]
    pub fn cost_of(image: &DynamicImage) -> usize {
        image.as_bytes().len()
    }

    /// Looks up an image and marks it most recently used.
    pub fn get(&self, key: &ImageKey) -> Option<Arc<DynamicImage>> {
        let found = self
            .store
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.image.clone());

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Image cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Image cache miss");
        }
        found
    }

    /// Peeks at an image without promoting it in the LRU.
    pub fn peek(&self, key: &ImageKey) -> Option<Arc<DynamicImage>> {
        self.store
            .lock()
            .entries
            .peek(key)
            .map(|entry| entry.image.clone())
    }

    /// Stores an image, replacing any entry under the same key, then evicts
    /// until the resident cost fits the capacity.
    pub fn put(&self, key: ImageKey, image: Arc<DynamicImage>, cost: usize) {
        let mut store = self.store.lock();

        if cost > self.capacity {
            if let Some(old) = store.entries.pop(&key) {
                store.total_cost -= old.cost;
            }
            debug!(key = %key, cost, capacity = self.capacity, "Image exceeds cache capacity, not cached");
            return;
        }

        if let Some(old) = store.entries.put(key.clone(), CacheEntry { image, cost }) {
            store.total_cost -= old.cost;
        }
        store.total_cost += cost;
        trace!(key = %key, cost, total = store.total_cost, "Stored image in cache");

        while store.total_cost > self.capacity {
            let Some((evicted, entry)) = store.entries.pop_lru() else {
                break;
            };
            store.total_cost -= entry.cost;
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key = %evicted, cost = entry.cost, "Evicted image from cache");
        }
    }

    /// Removes an image from the cache.
    pub fn remove(&self, key: &ImageKey) {
        let mut store = self.store.lock();
        if let Some(entry) = store.entries.pop(key) {
            store.total_cost -= entry.cost;
            debug!(key = %key, "Removed image from cache");
        }
    }

    /// Clears all images from the cache.
    pub fn clear(&self) {
        let mut store = self.store.lock();
        store.entries.clear();
        store.total_cost = 0;
        debug!("Cleared image cache");
    }

    /// Returns the number of resident images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.lock().entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the summed cost of resident images.
    #[must_use]
    pub fn total_cost(&self) -> usize {
        self.store.lock().total_cost
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let (size, total_cost) = {
            let store = self.store.lock();
            (store.entries.len(), store.total_cost)
        };
        CacheStats {
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate,
            size,
            total_cost,
            capacity: self.capacity,
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries evicted to respect the capacity.
    pub evictions: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Summed cost of cached images.
    pub total_cost: usize,
    /// Configured capacity.
    pub capacity: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {}/{} bytes, {:.1}% hit rate ({} hits, {} misses, {} evictions)",
            self.size,
            self.total_cost,
            self.capacity,
            self.hit_rate,
            self.hits,
            self.misses,
            self.evictions
        )
    }
}
