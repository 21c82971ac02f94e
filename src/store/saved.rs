//! Saved-photos index.
//!
//! Tracks which stored images the user has saved, as the ordered
//! `imageFileKeys` list of the user record. Keeping the list consistent with
//! the image store is the caller's job; the only automatic repair is the
//! removal of keys whose files turn out to be missing on fetch.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::key::StoredImageKey;
use super::preferences::PreferenceStore;

/// Preferences key of the user record.
pub const USER_RECORD_KEY: &str = "user";

/// The persisted user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "imageFileKeys", default)]
    pub image_file_keys: Vec<StoredImageKey>,
}

/// Handle to the saved-photos index. Clones share the same backend.
#[derive(Clone)]
pub struct SavedIndex {
    prefs: Arc<dyn PreferenceStore>,
    // Serializes read-modify-write cycles on the user record
    lock: Arc<Mutex<()>>,
}

impl SavedIndex {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self {
            prefs,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Write a fresh, empty user record, replacing any existing one.
    pub fn create(&self) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.save(&UserRecord::default());
    }

    /// Create the user record unless one already exists.
    pub fn ensure_created(&self) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.load().is_none() {
            self.save(&UserRecord::default());
        }
    }

    /// The saved keys, or `None` if no user record exists yet.
    pub fn get(&self) -> Option<Vec<StoredImageKey>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load().map(|record| record.image_file_keys)
    }

    /// Append `key`. Duplicates are not checked.
    pub fn add(&self, key: StoredImageKey) {
        self.update(|keys| keys.push(key));
    }

    /// Remove the first occurrence of `key`; no-op if absent.
    pub fn remove(&self, key: &StoredImageKey) {
        self.update(|keys| {
            if let Some(index) = keys.iter().position(|k| k == key) {
                keys.remove(index);
            }
        });
    }

    /// Overwrite the whole list.
    pub fn replace(&self, new_keys: Vec<StoredImageKey>) {
        self.update(|keys| *keys = new_keys);
    }

    /// Apply `f` to the stored list. Does nothing without a user record.
    fn update(&self, f: impl FnOnce(&mut Vec<StoredImageKey>)) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let Some(mut record) = self.load() else {
            debug!("No user record, saved index left untouched");
            return;
        };

        let before = record.image_file_keys.clone();
        f(&mut record.image_file_keys);
        if record.image_file_keys != before {
            self.save(&record);
        }
    }

    fn load(&self) -> Option<UserRecord> {
        let value = match self.prefs.load(USER_RECORD_KEY) {
            Ok(value) => value?,
            Err(e) => {
                error!(error = %e, "Failed to read user record");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                error!(error = %e, "Failed to decode user record");
                None
            }
        }
    }

    fn save(&self, record: &UserRecord) {
        let value = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "Failed to encode user record");
                return;
            }
        };

        match self.prefs.store(USER_RECORD_KEY, value) {
            Ok(()) => debug!(keys = record.image_file_keys.len(), "User record updated"),
            Err(e) => error!(error = %e, "Failed to write user record"),
        }
    }
}
