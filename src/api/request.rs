//! Request URL construction for the photo-search endpoint.
//!
//! URLs are assembled by hand rather than through `Url::query_pairs_mut`, which
//! form-encodes spaces as `+`. Query text is percent-encoded with `%20` so the
//! output matches what the API documents.

use url::Url;

use crate::error::NetworkError;

/// Default API base.
pub const DEFAULT_API_BASE: &str = "https://api.unsplash.com";

/// Route of the photo search endpoint, relative to the API base.
pub const SEARCH_PHOTOS_PATH: &str = "search/photos";

/// Default zero-based page.
pub const DEFAULT_PAGE: u32 = 0;

/// Default number of results per page.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Parameters of a photo search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,

    /// Zero-based page number
    pub page: u32,

    /// Page size
    pub per_page: u32,
}

impl SearchRequest {
    /// Create a search for the first page with the default page size.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Set the page and page size.
    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Build the request URL against `base`.
    pub fn url(&self, base: &Url) -> Result<Url, NetworkError> {
        search_photos_url(base, &self.query, self.page, self.per_page)
    }
}

/// Parse an API base URL, mapping failures to [`NetworkError::InvalidUrl`].
pub fn parse_base(base: &str) -> Result<Url, NetworkError> {
    let url = Url::parse(base).map_err(|_| NetworkError::InvalidUrl)?;
    if url.cannot_be_a_base() {
        return Err(NetworkError::InvalidUrl);
    }
    Ok(url)
}

/// Build the search URL: `<base>/search/photos?query=..&page=..&per_page=..`.
///
/// Any path already on `base` is kept and the route is appended to it. Any
/// query or fragment on `base` is dropped.
pub fn search_photos_url(
    base: &Url,
    query: &str,
    page: u32,
    per_page: u32,
) -> Result<Url, NetworkError> {
    if base.cannot_be_a_base() {
        return Err(NetworkError::InvalidUrl);
    }

    let mut url = base.clone();
    let path = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        SEARCH_PHOTOS_PATH
    );
    url.set_path(&path);
    url.set_fragment(None);

    let query_string = format!(
        "query={}&page={}&per_page={}",
        urlencoding::encode(query),
        page,
        per_page
    );
    url.set_query(Some(&query_string));

    Ok(url)
}
