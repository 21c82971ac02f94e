//! Photo service: search and image fetch against the remote API.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      PhotoService                        │
//! │  search_photos()                 fetch_image()           │
//! │   1. build URL                    1. parse literal URL   │
//! │   2. api transport + auth         2. image transport     │
//! │   3. validate → decode → project  3. validate → decode   │
//! │                                   4. populate ImageCache │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Calls are independent: there is no de-duplication and no ordering between
//! concurrent requests. Completion is single-shot. `spawn_*` variants run the
//! request on the tokio runtime and return a cancellable [`RequestHandle`].

use std::sync::Arc;

use image::DynamicImage;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::cache::ImageCache;
use super::models::Photo;
use super::pipeline;
use super::request::search_photos_url;
use crate::error::NetworkError;
use crate::transport::{HttpRequest, Transport};

/// Authorization scheme used by the API.
pub const AUTH_SCHEME: &str = "Client-ID";

/// Service for searching photos and downloading their images.
///
/// # Type Parameters
///
/// * `A` - transport used for API calls
/// * `I` - transport used for image downloads
pub struct PhotoService<A: Transport, I: Transport> {
    api: A,
    images: I,
    base: Url,
    access_key: String,
    cache: ImageCache,
}

impl<A: Transport, I: Transport> PhotoService<A, I> {
    /// Create a service with a default image cache.
    pub fn new(api: A, images: I, base: Url, access_key: impl Into<String>) -> Self {
        Self::with_cache(api, images, base, access_key, ImageCache::new())
    }

    /// Create a service with the given image cache.
    pub fn with_cache(
        api: A,
        images: I,
        base: Url,
        access_key: impl Into<String>,
        cache: ImageCache,
    ) -> Self {
        Self {
            api,
            images,
            base,
            access_key: access_key.into(),
            cache,
        }
    }

    /// The API base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The decoded-image cache.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Search photos matching `query`.
    #[instrument(skip(self), fields(base = %self.base))]
    pub async fn search_photos(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Photo>, NetworkError> {
        let url = search_photos_url(&self.base, query, page, per_page)?;
        let request = HttpRequest::get(url)
            .with_header("Authorization", format!("{} {}", AUTH_SCHEME, self.access_key));

        let outcome = self.api.get(request).await;
        let result = pipeline::search_results(outcome);

        match &result {
            Ok(photos) => info!(count = photos.len(), "Search completed"),
            Err(e) => warn!(error = %e, "Search failed"),
        }

        result
    }

    /// Download and decode the image at `url`.
    ///
    /// On success the raw bytes are stored in the image cache under `url`.
    /// The cache is never consulted here; see [`Self::cached_image`].
    #[instrument(skip(self))]
    pub async fn fetch_image(&self, url: &str) -> Result<DynamicImage, NetworkError> {
        let parsed = Url::parse(url).map_err(|_| NetworkError::InvalidUrl)?;

        let outcome = self.images.get(HttpRequest::get(parsed)).await;
        let (bytes, image) = pipeline::image_payload(outcome).map_err(|e| {
            warn!(error = %e, "Image fetch failed");
            e
        })?;

        self.cache.put(url, bytes).await;
        debug!(width = image.width(), height = image.height(), "Image fetched");

        Ok(image)
    }

    /// Decode a previously fetched image from the cache, if still present.
    pub async fn cached_image(&self, url: &str) -> Option<DynamicImage> {
        let bytes = self.cache.get(url).await?;
        pipeline::decode_image(&bytes).ok()
    }
}

impl<A, I> PhotoService<A, I>
where
    A: Transport + 'static,
    I: Transport + 'static,
{
    /// Run [`Self::search_photos`] as a cancellable background task.
    pub fn spawn_search(
        self: &Arc<Self>,
        query: impl Into<String>,
        page: u32,
        per_page: u32,
    ) -> RequestHandle<Vec<Photo>> {
        let service = Arc::clone(self);
        let query = query.into();
        RequestHandle::spawn(async move { service.search_photos(&query, page, per_page).await })
    }

    /// Run [`Self::fetch_image`] as a cancellable background task.
    pub fn spawn_fetch_image(self: &Arc<Self>, url: impl Into<String>) -> RequestHandle<DynamicImage> {
        let service = Arc::clone(self);
        let url = url.into();
        RequestHandle::spawn(async move { service.fetch_image(&url).await })
    }
}

/// Handle to an in-flight request.
///
/// Dropping the handle does not cancel the request; call [`Self::cancel`].
pub struct RequestHandle<T> {
    task: JoinHandle<Result<T, NetworkError>>,
}

impl<T: Send + 'static> RequestHandle<T> {
    fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<T, NetworkError>> + Send + 'static,
    {
        Self {
            task: tokio::spawn(future),
        }
    }

    /// Abort the request. Has no effect once it has completed.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// A detached handle that cancels the request, usable after
    /// [`Self::join`] has taken ownership of this handle.
    pub fn abort_handle(&self) -> AbortHandle {
        self.task.abort_handle()
    }

    /// Whether the request has completed or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the outcome. Returns `None` if the request was cancelled
    /// before completing.
    pub async fn join(self) -> Option<Result<T, NetworkError>> {
        match self.task.await {
            Ok(result) => Some(result),
            Err(e) if e.is_cancelled() => None,
            Err(e) => Some(Err(NetworkError::unknown(e))),
        }
    }
}
