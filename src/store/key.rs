use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, globally unique identifier of one stored image.
///
/// Keys are generated at save time and never reused. They carry no meaning
/// beyond uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredImageKey(String);

impl StoredImageKey {
    /// Generate a fresh key (uppercase UUIDv4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().to_uppercase())
    }

    /// Wrap an existing key string without validation.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key can name a file inside the store directory: non-empty
    /// and made only of ASCII alphanumerics and `-`.
    pub fn is_file_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-')
    }
}

impl fmt::Display for StoredImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StoredImageKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for StoredImageKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl AsRef<str> for StoredImageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
