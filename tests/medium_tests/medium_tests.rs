//! Tests for media
//!
//! These tests verify:
//! - RamMedium bounds and write counting
//! - FileMedium creation, padding and commit
//! - A store persisted through an image file

use std::fs;
use std::path::PathBuf;

use pstore::medium::{FileMedium, Medium, RamMedium, ERASED_BYTE};
use pstore::{Config, PersistentStore, RecordId, StoreError, ValueHandle};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_image() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("eeprom.bin");
    (temp_dir, path)
}

// =============================================================================
// RamMedium Tests
// =============================================================================

#[test]
fn test_ram_medium_starts_erased() {
    let medium = RamMedium::new(16);

    assert_eq!(medium.size(), 16);
    assert!(medium.as_bytes().iter().all(|&b| b == ERASED_BYTE));
    assert_eq!(medium.write_count(), 0);
}

#[test]
fn test_ram_medium_read_write() {
    let mut medium = RamMedium::new(16);

    medium.write(5, 42).unwrap();

    assert_eq!(medium.read(5).unwrap(), 42);
    assert_eq!(medium.write_count(), 1);
}

#[test]
fn test_ram_medium_out_of_bounds() {
    let mut medium = RamMedium::new(16);

    assert!(matches!(medium.read(16), Err(StoreError::Medium(_))));
    assert!(matches!(medium.write(16, 1), Err(StoreError::Medium(_))));
    assert_eq!(medium.write_count(), 0);
}

#[test]
fn test_ram_medium_from_bytes() {
    let medium = RamMedium::from_bytes(&[1, 2, 3]);

    assert_eq!(medium.size(), 3);
    assert_eq!(medium.read(2).unwrap(), 3);
}

// =============================================================================
// FileMedium Tests
// =============================================================================

#[test]
fn test_file_medium_creates_erased_image() {
    let (_temp, path) = setup_temp_image();

    let mut medium = FileMedium::open(&path, 64).unwrap();
    assert!(medium.is_dirty());
    assert!(!path.exists());

    medium.commit().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 64);
    assert!(bytes.iter().all(|&b| b == ERASED_BYTE));
    assert!(!medium.is_dirty());
}

#[test]
fn test_file_medium_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("eeprom.bin");

    let mut medium = FileMedium::open(&path, 16).unwrap();
    medium.commit().unwrap();

    assert!(path.exists());
    assert_eq!(medium.path(), path.as_path());
}

#[test]
fn test_file_medium_pads_short_image() {
    let (_temp, path) = setup_temp_image();
    fs::write(&path, [1, 2, 3]).unwrap();

    let medium = FileMedium::open(&path, 8).unwrap();

    assert_eq!(medium.size(), 8);
    assert_eq!(medium.read(2).unwrap(), 3);
    assert_eq!(medium.read(3).unwrap(), ERASED_BYTE);
    assert!(medium.is_dirty());
}

#[test]
fn test_file_medium_existing_image_is_clean() {
    let (_temp, path) = setup_temp_image();
    fs::write(&path, [7u8; 8]).unwrap();

    let medium = FileMedium::open(&path, 8).unwrap();

    assert!(!medium.is_dirty());
    assert_eq!(medium.read(7).unwrap(), 7);
}

#[test]
fn test_file_medium_zero_size_rejected() {
    let (_temp, path) = setup_temp_image();

    assert!(matches!(
        FileMedium::open(&path, 0),
        Err(StoreError::Config(_))
    ));
}

#[test]
fn test_file_medium_writes_are_not_durable_until_commit() {
    let (_temp, path) = setup_temp_image();
    let mut medium = FileMedium::open(&path, 8).unwrap();
    medium.commit().unwrap();

    medium.write(0, 0x11).unwrap();
    assert_eq!(fs::read(&path).unwrap()[0], ERASED_BYTE);

    medium.commit().unwrap();
    assert_eq!(fs::read(&path).unwrap()[0], 0x11);
}

// =============================================================================
// Store On File Tests
// =============================================================================

#[test]
fn test_store_round_trip_through_image_file() {
    let (_temp, path) = setup_temp_image();
    let key = RecordId::new("cfg");

    {
        let medium = FileMedium::open(&path, 256).unwrap();
        let mut store = PersistentStore::new(medium, &Config::default());
        store.open().unwrap();
        store
            .append(&mut ValueHandle::with_value(key, b"persisted"))
            .unwrap();
    }

    let medium = FileMedium::open(&path, 256).unwrap();
    let mut store = PersistentStore::new(medium, &Config::default());
    assert_eq!(store.open().unwrap(), 1);

    let mut probe = ValueHandle::new(key, 9);
    assert!(store.find(&mut probe).unwrap());
    assert_eq!(probe.bytes(), b"persisted");
}

#[test]
fn test_store_without_auto_commit_needs_explicit_commit() {
    let (_temp, path) = setup_temp_image();
    let config = Config::builder().auto_commit(false).build();

    let medium = FileMedium::open(&path, 64).unwrap();
    let mut store = PersistentStore::new(medium, &config);
    store.open().unwrap();
    store
        .append(&mut ValueHandle::with_value(RecordId::new("k"), &[1]))
        .unwrap();

    assert!(!path.exists());
    assert!(store.medium().is_dirty());

    store.commit().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[0..3], b"#>!");
    assert_eq!(&bytes[3..4], b"k");
}
