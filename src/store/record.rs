//! On-medium record layout
//!
//! ```text
//! ┌────────────┬──────────────┬──────────────────┐
//! │ Id (3)     │ Size (2, LE) │ Value (size)     │
//! └────────────┴──────────────┴──────────────────┘
//! ```

use bytes::Bytes;

use super::id::{RecordId, ID_LEN};

/// Width of the size field
pub const SIZE_LEN: usize = 2;

/// Id + size field length
pub const RECORD_HEADER_LEN: usize = ID_LEN + SIZE_LEN;

/// Address of the size field of a record starting at `address`
pub(crate) fn size_address(address: u16) -> u32 {
    address as u32 + ID_LEN as u32
}

/// Address of the value of a record starting at `address`
pub(crate) fn value_address(address: u16) -> u32 {
    address as u32 + RECORD_HEADER_LEN as u32
}

/// Address right after a record of `size` value bytes
pub(crate) fn next_address(address: u16, size: u16) -> u32 {
    value_address(address) + size as u32
}

pub(crate) fn encode_size(size: u16) -> [u8; SIZE_LEN] {
    size.to_le_bytes()
}

pub(crate) fn decode_size(bytes: [u8; SIZE_LEN]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// A record materialized from the medium
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Key of the record
    pub id: RecordId,
    /// Address of the id field
    pub address: u16,
    /// Value bytes (`value.len()` is the stored size)
    pub value: Bytes,
}

impl Record {
    /// Declared value size
    pub fn size(&self) -> u16 {
        self.value.len() as u16
    }

    /// Total length on the medium
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_LEN + self.value.len()
    }

    pub fn size_address(&self) -> u32 {
        size_address(self.address)
    }

    pub fn value_address(&self) -> u32 {
        value_address(self.address)
    }

    /// Where the following record (or the footer) starts
    pub fn next_address(&self) -> u32 {
        next_address(self.address, self.size())
    }
}
