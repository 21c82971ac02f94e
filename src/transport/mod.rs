//! Network transport layer.
//!
//! The photo service never talks to `reqwest` directly. It issues
//! [`HttpRequest`]s through the [`Transport`] trait and receives the raw
//! transport outcome: either a transport-level error or a [`RawResponse`]
//! that the response pipeline then interprets.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │         PhotoService         │
//! └──────────────┬───────────────┘
//!                │ Transport::get
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌──────────────┐  ┌────────────────────────────┐
//! │ HttpTransport│  │ CachingTransport<T>        │
//! │  (api)       │  │  memory + disk tiers       │
//! └──────────────┘  │  └─► HttpTransport (images)│
//!                   └────────────────────────────┘
//! ```

mod cache;
mod http;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::BoxError;

pub use cache::{
    CachingTransport, ResponseCache, DEFAULT_TRANSPORT_CACHE_BYTES, TRANSPORT_CACHE_DIR,
};
pub use http::{HttpTransport, ImageTimeouts, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESOURCE_TIMEOUT};

/// A GET request issued through a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// A GET request without headers.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as received from the transport, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status, or `None` when the response was not an HTTP response
    pub status: Option<u16>,

    /// Body bytes, if any were delivered
    pub body: Option<Bytes>,
}

impl RawResponse {
    /// An HTTP response with the given status and body.
    pub fn http(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
        }
    }

    /// An HTTP response with no body at all.
    pub fn without_body(status: u16) -> Self {
        Self {
            status: Some(status),
            body: None,
        }
    }

    /// A non-HTTP response carrying `body`.
    pub fn non_http(body: impl Into<Bytes>) -> Self {
        Self {
            status: None,
            body: Some(body.into()),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }
}

/// Executes requests and reports the raw outcome.
///
/// Implementations must be thread-safe. Each call completes exactly once and
/// must not retry on its own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request.
    ///
    /// `Err` means the request failed at the transport level (connection
    /// refused, timeout, TLS failure...). Any response that did arrive,
    /// whatever its status, is `Ok`.
    async fn get(&self, request: HttpRequest) -> Result<RawResponse, BoxError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, request: HttpRequest) -> Result<RawResponse, BoxError> {
        (**self).get(request).await
    }
}
