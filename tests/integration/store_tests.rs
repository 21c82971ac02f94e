//! Image store and saved-index integration tests.
//!
//! Tests verify:
//! - Lossless save/fetch round trips
//! - Orphan repair of the saved index
//! - Bulk replace invalidates old keys and keeps input order
//! - Persistence across reopened file-backed stores

use std::sync::Arc;

use photobook::{FilePreferences, ImageStore, SavedIndex, StoredImageKey};

use super::test_utils::{store_in, test_image};

#[test]
fn test_save_fetch_round_trip_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let original = test_image(42);
    let key = store.save(&original).expect("image saved");

    let fetched = store.fetch(&[key]);
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].as_bytes(), original.as_bytes());
    assert_eq!(fetched[0].color(), original.color());
}

#[test]
fn test_each_save_gets_a_fresh_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let image = test_image(1);
    let a = store.save(&image).unwrap();
    let b = store.save(&image).unwrap();

    assert_ne!(a, b);
    assert_eq!(store.keys().len(), 2);
}

#[test]
fn test_orphan_repair() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let index = store.index().clone();

    let keys: Vec<StoredImageKey> = (0..3).map(|i| store.save(&test_image(i)).unwrap()).collect();
    index.replace(keys.clone());

    // Delete the middle image behind the store's back
    std::fs::remove_file(store.dir().join(format!("{}.png", keys[1]))).unwrap();

    let fetched = store.fetch(&keys);
    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].as_bytes(), test_image(0).as_bytes());
    assert_eq!(fetched[1].as_bytes(), test_image(2).as_bytes());

    assert_eq!(index.get(), Some(vec![keys[0].clone(), keys[2].clone()]));
}

#[test]
fn test_bulk_replace() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let old_keys: Vec<StoredImageKey> =
        (10..12).map(|i| store.save(&test_image(i)).unwrap()).collect();

    let new_images = [test_image(1), test_image(2), test_image(3)];
    let new_keys = store.replace_all(&new_images);
    assert_eq!(new_keys.len(), 3);

    assert!(store.fetch(&old_keys).is_empty());

    let fetched = store.fetch(&new_keys);
    assert_eq!(fetched.len(), 3);
    for (fetched, original) in fetched.iter().zip(&new_images) {
        assert_eq!(fetched.as_bytes(), original.as_bytes());
    }

    let mut on_disk = store.keys();
    on_disk.sort();
    let mut expected = new_keys.clone();
    expected.sort();
    assert_eq!(on_disk, expected);
}

#[test]
fn test_delete_then_fetch_repairs_index() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let index = store.index().clone();

    let key = store.save(&test_image(5)).unwrap();
    index.add(key.clone());

    store.delete(&key);
    assert!(store.fetch(&[key]).is_empty());
    assert_eq!(index.get(), Some(vec![]));
}

#[test]
fn test_index_remove_absent_key_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let index = store.index().clone();

    let key = store.save(&test_image(1)).unwrap();
    index.add(key.clone());
    let before = index.get();

    index.remove(&StoredImageKey::generate());
    assert_eq!(index.get(), before);
}

#[test]
fn test_file_backed_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let key = {
        let index = SavedIndex::new(Arc::new(FilePreferences::in_data_dir(dir.path())));
        index.ensure_created();
        let store = ImageStore::in_data_dir(dir.path(), index.clone());

        let key = store.save(&test_image(77)).unwrap();
        index.add(key.clone());
        key
    };

    let index = SavedIndex::new(Arc::new(FilePreferences::in_data_dir(dir.path())));
    let store = ImageStore::in_data_dir(dir.path(), index.clone());

    let keys = index.get().expect("user record persisted");
    assert_eq!(keys, vec![key]);

    let images = store.fetch(&keys);
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].as_bytes(), test_image(77).as_bytes());
}

#[test]
fn test_orphan_repair_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let index = SavedIndex::new(Arc::new(FilePreferences::in_data_dir(dir.path())));
    index.create();
    let store = ImageStore::in_data_dir(dir.path(), index.clone());

    let missing = StoredImageKey::generate();
    index.add(missing.clone());
    assert!(store.fetch(&[missing]).is_empty());

    let reopened = SavedIndex::new(Arc::new(FilePreferences::in_data_dir(dir.path())));
    assert_eq!(reopened.get(), Some(vec![]));
}
