//! Tests for store initialization and open
//!
//! These tests verify:
//! - Range clamping and the too-small-range fallback
//! - Formatting an erased medium
//! - Idempotent open (same count, no writes)
//! - Clear and failure handling (store left uninitialized)
//! - Tolerance of a missing footer at the end of the range

mod common;

use common::{handle, open_ram_store, restart, FailingMedium};
use pstore::medium::{Medium, RamMedium};
use pstore::store::{RecordCursor, FOOTER_ID, HEADER_ID};
use pstore::{Config, PersistentStore, StoreError, ValueHandle};

// =============================================================================
// Range Tests
// =============================================================================

#[test]
fn test_default_range_is_whole_medium() {
    let store = PersistentStore::new(RamMedium::new(256), &Config::default());

    assert_eq!(store.range(), (0, 256));
    assert!(!store.is_initialized());
}

#[test]
fn test_range_end_clamped_to_medium() {
    let config = Config::builder().range(10, 1000).build();
    let store = PersistentStore::new(RamMedium::new(256), &config);

    assert_eq!(store.range(), (10, 256));
}

#[test]
fn test_begin_past_medium_end_falls_back_to_start() {
    let config = Config::builder().range(300, 200).build();
    let store = PersistentStore::new(RamMedium::new(256), &config);

    assert_eq!(store.range(), (0, 200));
}

#[test]
fn test_too_small_range_falls_back_to_whole_medium() {
    let config = Config::builder().range(100, 105).build();
    let store = PersistentStore::new(RamMedium::new(256), &config);

    assert_eq!(store.range(), (0, 256));
}

#[test]
fn test_inverted_range_falls_back_to_whole_medium() {
    let config = Config::builder().range(120, 60).build();
    let store = PersistentStore::new(RamMedium::new(256), &config);

    assert_eq!(store.range(), (0, 256));
}

#[test]
fn test_custom_range_places_header_at_begin() {
    let config = Config::builder().range(100, 200).build();
    let mut store = PersistentStore::new(RamMedium::new(256), &config);

    assert_eq!(store.open().unwrap(), 0);

    let bytes = store.medium().as_bytes();
    assert_eq!(&bytes[100..103], HEADER_ID.as_bytes());
    assert_eq!(&bytes[103..106], FOOTER_ID.as_bytes());
    // Outside the range nothing is touched
    assert!(bytes[..100].iter().all(|&b| b == 0xFF));
    assert!(bytes[106..].iter().all(|&b| b == 0xFF));
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_formats_erased_medium() {
    let mut store = PersistentStore::new(RamMedium::new(64), &Config::default());

    let count = store.open().unwrap();

    assert_eq!(count, 0);
    assert!(store.is_initialized());
    assert_eq!(store.next_write_address(), Some(3));

    let bytes = store.medium().as_bytes();
    assert_eq!(&bytes[0..3], b"#>!");
    assert_eq!(&bytes[3..6], b"#<!");
}

#[test]
fn test_open_keeps_formatted_store() {
    let mut store = open_ram_store(64);
    store.append(&mut handle("abc", &[1, 2, 3])).unwrap();

    let mut store = restart(store);

    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.open().unwrap(), 1);
}

#[test]
fn test_open_twice_is_idempotent() {
    let mut store = open_ram_store(128);
    store.append(&mut handle("a", &[1, 2, 3, 4])).unwrap();
    store.append(&mut handle("b", &[5, 6])).unwrap();

    let checksum = store.checksum().unwrap();
    let writes = store.medium().write_count();

    assert_eq!(store.open().unwrap(), 2);
    assert_eq!(store.open().unwrap(), 2);

    assert_eq!(store.medium().write_count(), writes);
    assert_eq!(store.checksum().unwrap(), checksum);
}

#[test]
fn test_open_sets_next_write_after_last_record() {
    let mut store = open_ram_store(128);
    store.append(&mut handle("a", &[1, 2, 3, 4])).unwrap();
    store.append(&mut handle("b", &[5, 6])).unwrap();

    let store = restart(store);

    // header (3) + a (3 + 2 + 4) + b (3 + 2 + 2)
    assert_eq!(store.next_write_address(), Some(19));
    assert_eq!(store.free_space(), Some(128 - 19 - 3));
}

// =============================================================================
// Clear Tests
// =============================================================================

#[test]
fn test_open_after_clear_returns_zero() {
    let mut store = open_ram_store(128);
    store.append(&mut handle("a", &[1, 2, 3, 4])).unwrap();
    store.append(&mut handle("b", &[5, 6])).unwrap();

    store.clear().unwrap();

    assert_eq!(store.next_write_address(), Some(3));
    assert_eq!(store.open().unwrap(), 0);
}

#[test]
fn test_clear_leaves_stale_bytes_unreachable() {
    let mut store = open_ram_store(128);
    store.append(&mut handle("a", &[1, 2, 3, 4])).unwrap();

    store.clear().unwrap();

    // The old value bytes are still on the medium
    assert_eq!(&store.medium().as_bytes()[8..12], &[1, 2, 3, 4]);

    let mut probe = ValueHandle::new(common::id("a"), 4);
    assert!(!store.find(&mut probe).unwrap());
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_clear_initializes_unopened_store() {
    let mut store = PersistentStore::new(RamMedium::new(64), &Config::default());

    store.clear().unwrap();

    assert!(store.is_initialized());
    assert_eq!(store.count().unwrap(), 0);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_operations_fail_before_open() {
    let mut store = PersistentStore::new(RamMedium::new(64), &Config::default());
    let mut value = handle("a", &[1]);

    assert!(matches!(store.find(&mut value), Err(StoreError::NotInitialized)));
    assert!(matches!(store.add(&mut value), Err(StoreError::NotInitialized)));
    assert!(matches!(store.append(&mut value), Err(StoreError::NotInitialized)));
    assert!(matches!(store.update(&value), Err(StoreError::NotInitialized)));
    assert!(matches!(store.count(), Err(StoreError::NotInitialized)));
    assert!(matches!(store.checksum(), Err(StoreError::NotInitialized)));

    let mut values = Vec::new();
    assert!(matches!(store.load(&mut values), Err(StoreError::NotInitialized)));

    let mut cursor = RecordCursor::new();
    assert!(matches!(store.iterate(&mut cursor), Err(StoreError::NotInitialized)));

    // Nothing was written
    assert_eq!(store.medium().write_count(), 0);
}

#[test]
fn test_open_fails_when_header_does_not_fit() {
    let mut store = PersistentStore::new(RamMedium::new(2), &Config::default());

    let result = store.open();

    assert!(matches!(result, Err(StoreError::OutOfRange { .. })));
    assert!(!store.is_initialized());
}

#[test]
fn test_open_write_failure_leaves_store_uninitialized() {
    let mut medium = FailingMedium::new(64);
    medium.write_budget = Some(0);
    let mut store = PersistentStore::new(medium, &Config::default());

    let result = store.open();

    assert!(matches!(result, Err(StoreError::Medium(_))));
    assert!(!store.is_initialized());
    assert!(matches!(store.count(), Err(StoreError::NotInitialized)));
}

#[test]
fn test_open_read_failure_leaves_store_uninitialized() {
    let mut medium = FailingMedium::new(64);
    medium.fail_reads = true;
    let mut store = PersistentStore::new(medium, &Config::default());

    assert!(matches!(store.open(), Err(StoreError::Medium(_))));
    assert!(!store.is_initialized());
}

#[test]
fn test_failed_reopen_resets_initialization() {
    let mut store = PersistentStore::new(FailingMedium::new(64), &Config::default());
    store.open().unwrap();
    assert!(store.is_initialized());

    let mut medium = store.into_medium();
    medium.fail_reads = true;
    let mut store = PersistentStore::new(medium, &Config::default());

    assert!(store.open().is_err());
    assert!(!store.is_initialized());
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_record_overrunning_range_is_treated_as_end() {
    // Header, then a record claiming 100 value bytes on a 32-byte medium
    let mut image = vec![0xFFu8; 32];
    image[0..3].copy_from_slice(b"#>!");
    image[3..6].copy_from_slice(b"abc");
    image[6..8].copy_from_slice(&100u16.to_le_bytes());

    let mut store = PersistentStore::new(RamMedium::from_bytes(&image), &Config::default());

    assert_eq!(store.open().unwrap(), 0);
    assert_eq!(store.next_write_address(), Some(3));

    // The dangling region is reused by the next append
    store.append(&mut handle("new", &[7, 7])).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(&store.medium().as_bytes()[10..13], b"#<!");
}

#[test]
fn test_missing_footer_at_end_of_range() {
    // A record filling the range exactly, with no room left for a footer
    let mut image = vec![0u8; 16];
    image[0..3].copy_from_slice(b"#>!");
    image[3..6].copy_from_slice(b"abc");
    image[6..8].copy_from_slice(&6u16.to_le_bytes());

    let mut store = PersistentStore::new(RamMedium::from_bytes(&image), &Config::default());

    assert_eq!(store.open().unwrap(), 0);
    assert_eq!(store.next_write_address(), Some(3));
    assert_eq!(store.medium().size(), 16);
}
