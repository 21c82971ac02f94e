//! Test utilities for integration tests.
//!
//! Mock transports with request tracking, image fixtures and canned API
//! payloads.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use url::Url;

use photobook::{
    BoxError, HttpRequest, ImageStore, MemoryPreferences, PhotoService, RawResponse, SavedIndex,
    Transport,
};

// =============================================================================
// Mock Transport with Request Tracking
// =============================================================================

/// Canned outcome for one URL.
#[derive(Clone)]
pub enum MockReply {
    Response(RawResponse),
    TransportError(&'static str),
}

/// A transport that answers from a URL → reply table and records requests.
///
/// Unknown URLs answer 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    request_count: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: &str, response: RawResponse) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), MockReply::Response(response));
        self
    }

    pub fn with_transport_error(self, url: &str, message: &'static str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), MockReply::TransportError(message));
        self
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: HttpRequest) -> Result<RawResponse, BoxError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned();
        self.requests.lock().unwrap().push(request);

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::TransportError(message)) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message,
            ))),
            None => Ok(RawResponse::http(404, Bytes::new())),
        }
    }
}

// =============================================================================
// Service and Store Builders
// =============================================================================

pub const API_BASE: &str = "https://api.unsplash.com";
pub const ACCESS_KEY: &str = "test-access-key";

/// URL the service builds for `query` on the first page of 20.
pub fn search_url(query: &str) -> String {
    format!("{API_BASE}/search/photos?query={query}&page=0&per_page=20")
}

pub fn service(api: MockTransport, images: MockTransport) -> PhotoService<MockTransport, MockTransport> {
    PhotoService::new(api, images, Url::parse(API_BASE).unwrap(), ACCESS_KEY)
}

/// An image store with an in-memory index that already has a user record.
pub fn store_in(dir: &Path) -> ImageStore {
    let index = SavedIndex::new(Arc::new(MemoryPreferences::new()));
    index.create();
    ImageStore::in_data_dir(dir, index)
}

// =============================================================================
// Fixtures
// =============================================================================

/// A small RGBA image whose pixels depend on `seed`.
pub fn test_image(seed: u8) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(8, 6, |x, y| {
        Rgba([seed, (x * 31) as u8, (y * 41) as u8, 255 - seed])
    }))
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn png_bytes(seed: u8) -> Vec<u8> {
    encode(&test_image(seed), ImageFormat::Png)
}

pub fn jpeg_bytes() -> Vec<u8> {
    let rgb = DynamicImage::ImageRgb8(test_image(7).to_rgb8());
    encode(&rgb, ImageFormat::Jpeg)
}

/// A search payload with `count` photos, shaped like the real API's.
pub fn search_body(count: usize) -> String {
    let results: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "id": format!("photo-{i}"),
                "width": 4000 + i,
                "height": 3000,
                "color": "#0C2626",
                "likes": 100 + i,
                "description": null,
                "alt_description": format!("photo number {i}"),
                "urls": {
                    "raw": format!("https://images.unsplash.com/photo-{i}"),
                    "full": format!("https://images.unsplash.com/photo-{i}?q=85"),
                    "regular": format!("https://images.unsplash.com/photo-{i}?w=1080")
                },
                "user": {
                    "name": format!("Photographer {i}"),
                    "location": if i % 2 == 0 { serde_json::Value::from("Oslo") } else { serde_json::Value::Null },
                    "bio": null,
                    "links": { "html": format!("https://unsplash.com/@p{i}") }
                }
            })
        })
        .collect();

    serde_json::json!({
        "total": count,
        "total_pages": 1,
        "results": results
    })
    .to_string()
}
