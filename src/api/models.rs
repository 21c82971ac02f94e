//! Decoded payloads of the photo-search API.

use serde::{Deserialize, Serialize};

/// Top-level search response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSearchResult {
    /// Total number of matches across all pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Total number of pages at the requested page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,

    /// Photos in server response order
    pub results: Vec<Photo>,
}

/// A single photo entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub width: i64,
    pub height: i64,

    /// Dominant color as a hex string, e.g. `#60544D`
    pub color: String,

    pub likes: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_description: Option<String>,

    pub urls: PhotoUrls,
    pub user: User,
}

impl Photo {
    /// Best available caption: description, then alt description.
    pub fn caption(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.alt_description.as_deref())
    }

    /// Width divided by height, or `None` for a degenerate height.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0).then(|| self.width as f64 / self.height as f64)
    }
}

/// Image URLs of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUrls {
    pub full: String,
    pub regular: String,
}

/// Author of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub location: Option<String>,
    pub bio: Option<String>,
    pub name: String,
    pub links: UserLinks,
}

/// Profile links of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLinks {
    pub html: String,
}
