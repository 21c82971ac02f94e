use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error type carried across the transport boundary.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Classified failures of the photo API client.
///
/// Every stage of the response pipeline converts its failure into one of these
/// kinds, so callers see a single terminal outcome per request.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// The response was valid but carried no body
    #[error("response carried no data")]
    NoData,

    /// The payload did not match the expected schema
    #[error("response payload could not be decoded")]
    DecodingError,

    /// The request URL was malformed, or the server answered with one of the
    /// classified 4xx/5xx statuses
    #[error("invalid URL")]
    InvalidUrl,

    /// The body did not decode as an image
    #[error("response body is not a valid image")]
    NoImage,

    /// Anything else, including transport failures such as connectivity loss
    #[error("unknown error: {0}")]
    Unknown(#[source] Arc<dyn StdError + Send + Sync + 'static>),
}

impl NetworkError {
    /// Map an arbitrary error into the taxonomy.
    ///
    /// Errors that already are a `NetworkError` keep their kind; everything
    /// else is wrapped as [`NetworkError::Unknown`].
    pub fn normalize(err: BoxError) -> Self {
        match err.downcast::<NetworkError>() {
            Ok(network) => *network,
            Err(other) => NetworkError::Unknown(Arc::from(other)),
        }
    }

    /// Wrap a concrete error as [`NetworkError::Unknown`].
    pub fn unknown<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        NetworkError::Unknown(Arc::new(err))
    }
}

/// Errors produced while validating configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A required value is missing or empty
    #[error("missing {name}: set {hint}")]
    Missing { name: &'static str, hint: &'static str },

    /// A value is outside its accepted range or malformed
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
