//! Typed client for the Unsplash photo-search API.
//!
//! # Components
//!
//! - [`request`]: pure URL construction for `search/photos`
//! - [`pipeline`]: stages that turn a transport outcome into a typed result
//! - [`PhotoService`]: search and image fetch, with a bounded [`ImageCache`]
//! - [`models`]: decoded payload types
//!
//! # Example
//!
//! ```no_run
//! use photobook::api::{parse_base, PhotoService, DEFAULT_API_BASE};
//! use photobook::transport::{HttpTransport, ImageTimeouts};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), photobook::NetworkError> {
//!     let service = PhotoService::new(
//!         HttpTransport::api()?,
//!         HttpTransport::images(ImageTimeouts::default())?,
//!         parse_base(DEFAULT_API_BASE)?,
//!         "your-access-key",
//!     );
//!
//!     let photos = service.search_photos("lighthouse", 0, 20).await?;
//!     if let Some(photo) = photos.first() {
//!         let image = service.fetch_image(&photo.urls.regular).await?;
//!         println!("{}x{}", image.width(), image.height());
//!     }
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod pipeline;
pub mod request;
mod service;

pub use crate::cache::{ImageCache, DEFAULT_IMAGE_CACHE_CAPACITY, DEFAULT_IMAGE_CACHE_ENTRIES};
pub use models::{Photo, PhotoSearchResult, PhotoUrls, User, UserLinks};
pub use request::{
    parse_base, search_photos_url, SearchRequest, DEFAULT_API_BASE, DEFAULT_PAGE,
    DEFAULT_PER_PAGE, SEARCH_PHOTOS_PATH,
};
pub use service::{PhotoService, RequestHandle, AUTH_SCHEME};
