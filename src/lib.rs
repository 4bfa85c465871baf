//! # pstore
//!
//! A log-structured key/value persistence engine for byte-addressable
//! non-volatile memory (EEPROM and friends):
//! - Records keyed by a 3-byte id and their size
//! - Write-if-different updates to minimize wear
//! - Append-only growth with rewrite-based compaction
//! - Typed persistent values (numbers, bools, strings, tags)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Typed Values                             │
//! │        (PersistentScalar / PersistentString / Tag)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  ValueHandle (id, size, address, bytes)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   PersistentStore                            │
//! │         (scan / find / append / reconcile / clear)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  read / write / commit
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Medium                                 │
//! │                (RamMedium / FileMedium)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod medium;
pub mod store;
pub mod values;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use store::{Persistent, PersistentStore, RecordId, SharedStore, ValueHandle};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
