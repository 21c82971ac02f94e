//! Transport-level response cache.
//!
//! A small two-tier cache in front of the image transport: an in-memory LRU
//! and a directory of body files, each bounded in total bytes. Only successful
//! (2xx) responses that carry a body are stored. Entries are keyed by the full
//! request URL; disk files are named by the SHA-256 of that URL.
//!
//! This is distinct from the decoded-image cache owned by the photo service.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{HttpRequest, RawResponse, Transport};
use crate::cache::ImageCache;
use crate::error::BoxError;

/// Default byte budget of each tier (20 KiB).
pub const DEFAULT_TRANSPORT_CACHE_BYTES: usize = 20 * 1024;

/// Directory name of the disk tier under the data directory.
pub const TRANSPORT_CACHE_DIR: &str = "transport_cache";

const MEMORY_TIER_ENTRIES: usize = 64;

/// Memory + disk cache of response bodies.
pub struct ResponseCache {
    memory: ImageCache,
    disk: Option<DiskTier>,
}

struct DiskTier {
    dir: PathBuf,
    capacity: usize,
}

impl ResponseCache {
    /// Memory-only cache bounded by `memory_capacity` bytes.
    pub fn in_memory(memory_capacity: usize) -> Self {
        Self {
            memory: ImageCache::with_capacity_and_entries(memory_capacity, MEMORY_TIER_ENTRIES),
            disk: None,
        }
    }

    /// Cache with both tiers. The disk directory is created on first write.
    pub fn with_disk(memory_capacity: usize, dir: impl Into<PathBuf>, disk_capacity: usize) -> Self {
        Self {
            memory: ImageCache::with_capacity_and_entries(memory_capacity, MEMORY_TIER_ENTRIES),
            disk: Some(DiskTier {
                dir: dir.into(),
                capacity: disk_capacity,
            }),
        }
    }

    /// Look up a body, promoting disk hits into memory.
    pub async fn get(&self, url: &str) -> Option<Bytes> {
        if let Some(body) = self.memory.get(url).await {
            debug!(url, "Transport cache memory hit");
            return Some(body);
        }

        let disk = self.disk.as_ref()?;
        let body = Bytes::from(tokio::fs::read(disk.path_for(url)).await.ok()?);
        debug!(url, size = body.len(), "Transport cache disk hit");
        self.memory.put(url, body.clone()).await;
        Some(body)
    }

    /// Store a body in every tier it fits in.
    pub async fn put(&self, url: &str, body: Bytes) {
        self.memory.put(url, body.clone()).await;

        if let Some(disk) = &self.disk {
            if let Err(e) = disk.store(url, &body).await {
                warn!(url, error = %e, "Failed to write transport cache entry");
            }
        }
    }
}

impl DiskTier {
    fn path_for(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir.join(format!("{}.bin", hex::encode(digest)))
    }

    async fn store(&self, url: &str, body: &[u8]) -> std::io::Result<()> {
        if body.len() > self.capacity {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(url);
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, body).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        self.evict(&path).await
    }

    /// Remove the oldest files until the tier fits its capacity again. The
    /// entry just written is never evicted.
    async fn evict(&self, keep: &Path) -> std::io::Result<()> {
        let mut files: Vec<(PathBuf, u64, SystemTime)> = Vec::new();
        let mut total: u64 = 0;

        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("bin") {
                continue;
            }
            let meta = entry.metadata().await?;
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            total += meta.len();
            files.push((path, meta.len(), modified));
        }

        files.sort_by_key(|(_, _, modified)| *modified);

        for (path, len, _) in files {
            if total <= self.capacity as u64 {
                break;
            }
            if path == keep {
                continue;
            }
            tokio::fs::remove_file(&path).await?;
            total = total.saturating_sub(len);
            debug!(path = %path.display(), "Evicted transport cache file");
        }

        Ok(())
    }
}

/// Transport decorator that serves repeated GETs from a [`ResponseCache`].
pub struct CachingTransport<T> {
    inner: T,
    cache: ResponseCache,
}

impl<T: Transport> CachingTransport<T> {
    pub fn new(inner: T, cache: ResponseCache) -> Self {
        Self { inner, cache }
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for CachingTransport<T> {
    async fn get(&self, request: HttpRequest) -> Result<RawResponse, BoxError> {
        let key = request.url.as_str().to_owned();

        if let Some(body) = self.cache.get(&key).await {
            return Ok(RawResponse::http(200, body));
        }

        let response = self.inner.get(request).await?;
        if response.is_success() {
            if let Some(body) = &response.body {
                self.cache.put(&key, body.clone()).await;
            }
        }

        Ok(response)
    }
}
