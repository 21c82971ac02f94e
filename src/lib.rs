//! # photobook
//!
//! Core of a photo browsing application: a typed client for the Unsplash
//! photo-search API and a content-addressed local store for saved photos.
//!
//! ## Architecture
//!
//! - [`cache`] - byte-bounded LRU shared by the service and the transport cache
//! - [`api`] - request building, the response pipeline and [`PhotoService`]
//! - [`transport`] - the [`Transport`] seam, `reqwest` transport and response cache
//! - [`store`] - [`ImageStore`], [`SavedIndex`] and preference backends
//! - [`config`] - CLI and configuration types
//!
//! Services are plain values built by the caller; nothing here is global.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use photobook::{FilePreferences, ImageStore, SavedIndex};
//!
//! let data_dir = std::path::Path::new("/tmp/photobook");
//! let index = SavedIndex::new(Arc::new(FilePreferences::in_data_dir(data_dir)));
//! index.ensure_created();
//!
//! let store = ImageStore::in_data_dir(data_dir, index.clone());
//! let keys = index.get().unwrap_or_default();
//! let images = store.fetch(&keys);
//! println!("{} saved photo(s)", images.len());
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use api::{
    parse_base, search_photos_url, ImageCache, Photo, PhotoSearchResult, PhotoService,
    PhotoUrls, RequestHandle, SearchRequest, User, UserLinks, DEFAULT_API_BASE,
};
pub use config::{Cli, Command, Config, SearchArgs};
pub use error::{BoxError, ConfigError, NetworkError};
pub use store::{
    FilePreferences, ImageStore, MemoryPreferences, PreferenceStore, SavedIndex, StoredImageKey,
    UserRecord,
};
pub use transport::{
    CachingTransport, HttpRequest, HttpTransport, ImageTimeouts, RawResponse, ResponseCache,
    Transport,
};
