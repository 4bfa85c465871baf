//! Record identifiers
//!
//! Every stored value is keyed by a fixed 3-byte id.

use std::fmt;

use crate::error::{Result, StoreError};

/// Length of an id on the medium
pub const ID_LEN: usize = 3;

/// Fixed-length key of a stored record
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId([u8; ID_LEN]);

/// Marks the start of a formatted range
pub const HEADER_ID: RecordId = RecordId(*b"#>!");

/// Terminates the record sequence
pub const FOOTER_ID: RecordId = RecordId(*b"#<!");

impl RecordId {
    /// Build an id from raw bytes
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an id from a short string
    ///
    /// Bytes past `ID_LEN` are dropped, missing bytes are zero.
    pub fn new(id: &str) -> Self {
        let mut bytes = [0u8; ID_LEN];
        for (slot, byte) in bytes.iter_mut().zip(id.bytes()) {
            *slot = byte;
        }
        Self(bytes)
    }

    /// Build an id usable as a user key
    pub fn user(id: &str) -> Result<Self> {
        let id = Self::new(id);
        if id.is_reserved() {
            return Err(StoreError::InvalidId(format!(
                "'{}' is reserved for the store layout",
                id
            )));
        }
        Ok(id)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Header and footer ids cannot be user keys
    pub fn is_reserved(&self) -> bool {
        *self == HEADER_ID || *self == FOOTER_ID
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Trailing NULs are padding, not part of the key
        let end = self.0.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        for &byte in &self.0[..end] {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId(\"{}\")", self)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
