//! Local persistence for saved photos.
//!
//! ```text
//! ┌─────────────────────────────┐     ┌──────────────────────────┐
//! │         ImageStore          │────►│        SavedIndex        │
//! │  stored_images/<KEY>.png    │     │ user.imageFileKeys [...] │
//! └─────────────────────────────┘     └────────────┬─────────────┘
//!                                                  ▼
//!                                     ┌──────────────────────────┐
//!                                     │     PreferenceStore      │
//!                                     │ (file or in-memory JSON) │
//!                                     └──────────────────────────┘
//! ```
//!
//! The store and the index are independent. Callers mutate both side by side
//! (save then add, delete then remove); the store only touches the index to
//! drop keys whose files have gone missing.

mod images;
mod key;
mod preferences;
mod saved;

pub use images::{ImageStore, IMAGE_EXTENSION, STORED_IMAGES_DIR};
pub use key::StoredImageKey;
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore, PREFERENCES_FILE};
pub use saved::{SavedIndex, UserRecord, USER_RECORD_KEY};
