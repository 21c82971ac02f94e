//! Content-addressed image store.
//!
//! Images are stored losslessly as PNG, one file per key:
//!
//! ```text
//! <data dir>/stored_images/
//! ├── 3F2504E0-4F89-41D3-9A0C-0305E82C3301.png
//! └── 9B1DEB4D-3B7D-4BAD-9BDD-2B0D7B3DCB6D.png
//! ```
//!
//! Every operation is best-effort: failures are logged and reported through
//! an absent or shorter result, never as an error or a panic.
//!
//! `replace_all` clears and refills the directory in two steps. Concurrent
//! calls during that window can observe an empty or partially refilled store;
//! callers must serialize `replace_all` against other operations themselves.

use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use image::error::{ImageError, UnsupportedError, UnsupportedErrorKind};
use image::{DynamicImage, ImageFormat};
use tracing::{debug, error, info, warn};

use super::key::StoredImageKey;
use super::saved::SavedIndex;

/// Directory name of the store under the data directory.
pub const STORED_IMAGES_DIR: &str = "stored_images";

/// File extension of stored images.
pub const IMAGE_EXTENSION: &str = "png";

/// Local store of saved images.
pub struct ImageStore {
    dir: PathBuf,
    index: SavedIndex,
}

impl ImageStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// Failure to create the directory is logged; the store then stays
    /// unusable until the directory can be created.
    pub fn new(dir: impl Into<PathBuf>, index: SavedIndex) -> Self {
        let store = Self {
            dir: dir.into(),
            index,
        };
        store.ensure_dir();
        store
    }

    /// Open the store in its default location under `data_dir`.
    pub fn in_data_dir(data_dir: &Path, index: SavedIndex) -> Self {
        Self::new(data_dir.join(STORED_IMAGES_DIR), index)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The saved-photos index repaired by [`Self::fetch`].
    pub fn index(&self) -> &SavedIndex {
        &self.index
    }

    /// Persist `image` under a fresh key.
    pub fn save(&self, image: &DynamicImage) -> Option<StoredImageKey> {
        let data = match encode_png(image) {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "Failed to convert image to PNG data");
                return None;
            }
        };

        if !self.ensure_dir() {
            return None;
        }

        let key = StoredImageKey::generate();
        let path = self.path_for(&key)?;

        match write_atomic(&path, &data) {
            Ok(()) => {
                debug!(key = %key, size = data.len(), "Image saved");
                Some(key)
            }
            Err(e) => {
                error!(key = %key, error = %e, "Error saving image");
                None
            }
        }
    }

    /// Load the images for `keys`, in order.
    ///
    /// Keys whose file is missing, and keys that cannot name a file at all,
    /// are skipped and removed from the saved index. Files that exist but do
    /// not decode are skipped and kept.
    pub fn fetch(&self, keys: &[StoredImageKey]) -> Vec<DynamicImage> {
        keys.iter().filter_map(|key| self.fetch_one(key)).collect()
    }

    fn fetch_one(&self, key: &StoredImageKey) -> Option<DynamicImage> {
        // A malformed key can never name a file, so it is an orphan too
        let Some(path) = self.path_for(key) else {
            self.index.remove(key);
            return None;
        };

        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(key = %key, "Image not found, removing key from saved index");
                self.index.remove(key);
                return None;
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to read stored image");
                return None;
            }
        };

        match image::load_from_memory_with_format(&data, ImageFormat::Png) {
            Ok(image) => Some(image),
            Err(e) => {
                error!(key = %key, error = %e, "Stored image is not decodable");
                None
            }
        }
    }

    /// Remove the image stored under `key`, if any.
    pub fn delete(&self, key: &StoredImageKey) {
        let Some(path) = self.path_for(key) else {
            return;
        };

        match std::fs::remove_file(&path) {
            Ok(()) => debug!(key = %key, "Image deleted"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(key = %key, "File to delete does not exist");
            }
            Err(e) => error!(key = %key, error = %e, "Error deleting image"),
        }
    }

    /// Clear the store, then save `images` in order.
    ///
    /// Returns the keys of the images that saved successfully, in input
    /// order. Returns nothing if the store could not be cleared.
    pub fn replace_all(&self, images: &[DynamicImage]) -> Vec<StoredImageKey> {
        if !self.clear() {
            return Vec::new();
        }

        let keys: Vec<StoredImageKey> = images
            .iter()
            .filter_map(|image| {
                let key = self.save(image);
                if key.is_none() {
                    error!("Failed to save image during bulk replace");
                }
                key
            })
            .collect();

        info!(saved = keys.len(), requested = images.len(), "Store replaced");
        keys
    }

    /// Whether a file exists for `key`.
    pub fn contains(&self, key: &StoredImageKey) -> bool {
        self.path_for(key).is_some_and(|path| path.is_file())
    }

    /// Keys of every image currently on disk, sorted.
    pub fn keys(&self) -> Vec<StoredImageKey> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %self.dir.display(), error = %e, "Failed to list stored images");
                return Vec::new();
            }
        };

        let mut keys: Vec<StoredImageKey> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(IMAGE_EXTENSION))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?;
                let key = StoredImageKey::new(stem);
                key.is_file_safe().then_some(key)
            })
            .collect();
        keys.sort();
        keys
    }

    fn path_for(&self, key: &StoredImageKey) -> Option<PathBuf> {
        if !key.is_file_safe() {
            warn!(key = %key, "Rejecting malformed image key");
            return None;
        }
        Some(self.dir.join(format!("{}.{}", key, IMAGE_EXTENSION)))
    }

    fn ensure_dir(&self) -> bool {
        if self.dir.is_dir() {
            return true;
        }
        match std::fs::create_dir_all(&self.dir) {
            Ok(()) => true,
            Err(e) => {
                error!(dir = %self.dir.display(), error = %e, "Failed to create images directory");
                false
            }
        }
    }

    fn clear(&self) -> bool {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                error!(dir = %self.dir.display(), error = %e, "Error clearing images directory");
                return false;
            }
        }
        self.ensure_dir()
    }
}

/// Encode as PNG. Float images have no exact PNG representation and are
/// refused rather than quantized.
fn encode_png(image: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    if matches!(
        image,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
    ) {
        return Err(ImageError::Unsupported(
            UnsupportedError::from_format_and_kind(
                ImageFormat::Png.into(),
                UnsupportedErrorKind::Color(image.color().into()),
            ),
        ));
    }

    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = path.with_extension(format!("{}.tmp", IMAGE_EXTENSION));
    std::fs::write(&temp_path, data)?;
    std::fs::rename(&temp_path, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&temp_path);
    })
}
