//! User-preferences storage.
//!
//! Preferences are a set of named JSON records. Records are always read and
//! written whole; there are no partial field updates at this layer.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

/// File name of the preferences file under the data directory.
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Backend holding named preference records.
pub trait PreferenceStore: Send + Sync {
    /// Load the record stored under `key`. `Ok(None)` if there is none.
    fn load(&self, key: &str) -> io::Result<Option<Value>>;

    /// Replace the record stored under `key`.
    fn store(&self, key: &str, value: Value) -> io::Result<()>;
}

/// Preferences persisted as one JSON object in a file.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Preferences file inside `data_dir`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> io::Result<Map<String, Value>> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e),
        };

        serde_json::from_slice(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl PreferenceStore for FilePreferences {
    fn load(&self, key: &str) -> io::Result<Option<Value>> {
        Ok(self.read_all()?.remove(key))
    }

    fn store(&self, key: &str, value: Value) -> io::Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(&all)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, data)?;
        std::fs::rename(&temp_path, &self.path)
    }
}

/// Volatile preferences, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    records: Mutex<HashMap<String, Value>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> io::Result<Option<Value>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(key).cloned())
    }

    fn store(&self, key: &str, value: Value) -> io::Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(key.to_string(), value);
        Ok(())
    }
}
