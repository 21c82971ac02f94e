//! `reqwest`-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{HttpRequest, RawResponse, Transport};
use crate::error::{BoxError, NetworkError};

/// Default per-request (read) timeout for image downloads.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-resource (total) timeout for image downloads.
pub const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeouts of the image transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTimeouts {
    /// Maximum idle time between reads
    pub request: Duration,

    /// Maximum time for the whole transfer
    pub resource: Duration,
}

impl Default for ImageTimeouts {
    fn default() -> Self {
        Self {
            request: DEFAULT_REQUEST_TIMEOUT,
            resource: DEFAULT_RESOURCE_TIMEOUT,
        }
    }
}

/// HTTP transport backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Transport for API calls. No explicit timeout is set.
    pub fn api() -> Result<Self, NetworkError> {
        let client = Client::builder()
            .user_agent(concat!("photobook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NetworkError::unknown)?;
        Ok(Self { client })
    }

    /// Dedicated transport for image downloads.
    pub fn images(timeouts: ImageTimeouts) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .user_agent(concat!("photobook/", env!("CARGO_PKG_VERSION")))
            .read_timeout(timeouts.request)
            .timeout(timeouts.resource)
            .build()
            .map_err(NetworkError::unknown)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: HttpRequest) -> Result<RawResponse, BoxError> {
        let mut builder = self.client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!(url = %request.url, status, size = body.len(), "HTTP response received");

        Ok(RawResponse::http(status, body))
    }
}
