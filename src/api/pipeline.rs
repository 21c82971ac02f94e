//! Response pipeline.
//!
//! Turns a raw transport outcome into a typed value or a classified
//! [`NetworkError`]. Stages run strictly left to right and the first failure
//! short-circuits the rest:
//!
//! ```text
//! transport outcome ─► validate ─► decode_json ─► project ─► normalize
//!                          │
//!                          └──────► decode_image ─► cache ─► normalize
//! ```
//!
//! Every stage returns its failure as a value; nothing here panics or lets an
//! unclassified error escape.

use bytes::Bytes;
use image::DynamicImage;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{Photo, PhotoSearchResult};
use crate::error::{BoxError, NetworkError};
use crate::transport::RawResponse;

/// HTTP statuses that are classified as [`NetworkError::InvalidUrl`].
///
/// Client, auth and server failures all map to the same kind.
pub const CLASSIFIED_STATUSES: [u16; 7] = [400, 401, 403, 404, 422, 500, 503];

/// Classify an HTTP status. `None` means the status passes through.
pub fn classify_status(status: u16) -> Option<NetworkError> {
    CLASSIFIED_STATUSES
        .contains(&status)
        .then_some(NetworkError::InvalidUrl)
}

/// Stage 1: validate the transport outcome and extract the body.
pub fn validate(outcome: Result<RawResponse, BoxError>) -> Result<Bytes, NetworkError> {
    let response = outcome.map_err(|e| {
        debug!(error = %e, "Transport failure");
        normalize(e)
    })?;

    let Some(status) = response.status else {
        warn!("Response is not an HTTP response");
        return Err(NetworkError::InvalidUrl);
    };

    if let Some(err) = classify_status(status) {
        warn!(status, "Request rejected by server");
        return Err(err);
    }

    response.body.ok_or(NetworkError::NoData)
}

/// Stage 2: decode JSON. The parse error itself is discarded.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, NetworkError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Failed to decode response payload");
        NetworkError::DecodingError
    })
}

/// Stage 3 (search): project the photo list out of the envelope.
pub fn project_results(envelope: PhotoSearchResult) -> Vec<Photo> {
    envelope.results
}

/// Stage 3 (image): decode the body as an image.
pub fn decode_image(body: &[u8]) -> Result<DynamicImage, NetworkError> {
    image::load_from_memory(body).map_err(|e| {
        debug!(error = %e, size = body.len(), "Body is not a decodable image");
        NetworkError::NoImage
    })
}

/// Stage 5: fold any error into the taxonomy.
pub fn normalize(err: BoxError) -> NetworkError {
    NetworkError::normalize(err)
}

/// Stages 1 → 2 → 3 for a search response.
pub fn search_results(outcome: Result<RawResponse, BoxError>) -> Result<Vec<Photo>, NetworkError> {
    validate(outcome)
        .and_then(|body| decode_json::<PhotoSearchResult>(&body))
        .map(project_results)
}

/// Stages 1 → 3 for an image response, returning the raw bytes alongside the
/// decoded image so the caller can run the cache stage.
pub fn image_payload(
    outcome: Result<RawResponse, BoxError>,
) -> Result<(Bytes, DynamicImage), NetworkError> {
    let body = validate(outcome)?;
    let image = decode_image(&body)?;
    Ok((body, image))
}
