//! Error types for pstore
//!
//! Provides a unified error type for all store operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for pstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Store not initialized")]
    NotInitialized,

    // -------------------------------------------------------------------------
    // Medium Errors
    // -------------------------------------------------------------------------
    #[error("Address out of range: {address} + {len} not within [{begin}, {end})")]
    OutOfRange {
        address: u32,
        len: u32,
        begin: u16,
        end: u16,
    },

    #[error("Medium I/O failure: {0}")]
    Medium(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Value is not stored")]
    NotStored,

    #[error("Stale handle: record at {address} is no longer '{id}'")]
    StaleHandle { id: String, address: u16 },

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Unsupported value: {0}")]
    Unsupported(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
