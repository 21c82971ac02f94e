//! Bounded in-memory cache of response payloads keyed by URL.
//!
//! The photo service stores the raw bytes of successful image fetches here,
//! and the transport response cache uses the same type as its memory tier.
//! The cache is an optimization only and never a source of truth.
//!
//! # Eviction
//!
//! The cache is bounded both by total byte size and by entry count. When either
//! bound is exceeded, least-recently-used entries are dropped. Callers must not
//! rely on any particular eviction order.

use std::num::NonZeroUsize;
use std::sync::Arc;

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;

/// Default cache capacity: 50MB
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 50 * 1024 * 1024;

/// Default maximum number of cached images
pub const DEFAULT_IMAGE_CACHE_ENTRIES: usize = 256;

/// LRU cache of raw image bytes keyed by source URL.
///
/// # Example
///
/// ```
/// use photobook::cache::ImageCache;
/// use bytes::Bytes;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = ImageCache::new();
///     let url = "https://images.unsplash.com/photo-1?w=1080";
///
///     cache.put(url, Bytes::from_static(b"\x89PNG")).await;
///     assert!(cache.contains(url).await);
/// }
/// ```
pub struct ImageCache {
    entries: RwLock<Entries>,
    max_size: usize,
}

struct Entries {
    lru: LruCache<Arc<str>, Bytes>,
    size: usize,
}

impl ImageCache {
    /// Create a cache with default capacity.
    pub fn new() -> Self {
        Self::with_capacity_and_entries(DEFAULT_IMAGE_CACHE_CAPACITY, DEFAULT_IMAGE_CACHE_ENTRIES)
    }

    /// Create a cache bounded by `max_size` bytes and `max_entries` entries.
    ///
    /// A zero entry bound is treated as one.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let max_entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(Entries {
                lru: LruCache::new(max_entries),
                size: 0,
            }),
            max_size,
        }
    }

    /// Get cached bytes for `url`, marking the entry as recently used.
    pub async fn get(&self, url: &str) -> Option<Bytes> {
        let mut entries = self.entries.write().await;
        entries.lru.get(url).cloned()
    }

    /// Check for an entry without touching recency.
    pub async fn contains(&self, url: &str) -> bool {
        let entries = self.entries.read().await;
        entries.lru.contains(url)
    }

    /// Store bytes for `url`. The last writer for a URL wins.
    ///
    /// Entries larger than the whole capacity are not stored.
    pub async fn put(&self, url: &str, data: Bytes) {
        if data.len() > self.max_size {
            tracing::debug!(url, size = data.len(), "Image larger than cache capacity, skipping");
            return;
        }

        let mut entries = self.entries.write().await;
        let Entries { lru, size } = &mut *entries;

        let replaced = lru.peek(url).map(Bytes::len);
        if let Some(old_len) = replaced {
            *size = size.saturating_sub(old_len);
        }

        *size += data.len();
        // push hands back either the replaced value (already accounted for)
        // or the entry evicted by the count bound
        if let Some((_, evicted)) = lru.push(Arc::from(url), data) {
            if replaced.is_none() {
                *size = size.saturating_sub(evicted.len());
            }
        }

        while *size > self.max_size {
            match lru.pop_lru() {
                Some((_, evicted)) => *size = size.saturating_sub(evicted.len()),
                None => break,
            }
        }
    }

    /// Remove the entry for `url`.
    pub async fn remove(&self, url: &str) -> Option<Bytes> {
        let mut entries = self.entries.write().await;
        let removed = entries.lru.pop(url);
        if let Some(ref data) = removed {
            entries.size = entries.size.saturating_sub(data.len());
        }
        removed
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.lru.clear();
        entries.size = 0;
    }

    /// Number of cached images.
    pub async fn len(&self) -> usize {
        self.entries.read().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.lru.is_empty()
    }

    /// Total cached bytes.
    pub async fn size(&self) -> usize {
        self.entries.read().await.size
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}
