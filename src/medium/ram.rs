//! In-memory medium
//!
//! Volatile byte array behaving like a freshly erased EEPROM.

use crate::error::{Result, StoreError};

use super::{Medium, ERASED_BYTE};

/// Medium backed by a byte vector
///
/// Counts physical writes so callers can observe wear.
#[derive(Debug, Clone)]
pub struct RamMedium {
    data: Vec<u8>,
    writes: u64,
}

impl RamMedium {
    /// Create an erased medium of `size` bytes
    pub fn new(size: u16) -> Self {
        Self {
            data: vec![ERASED_BYTE; size as usize],
            writes: 0,
        }
    }

    /// Create a medium holding a copy of `bytes`
    ///
    /// Anything past `u16::MAX` bytes is not addressable and is dropped.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let len = bytes.len().min(u16::MAX as usize);
        Self {
            data: bytes[..len].to_vec(),
            writes: 0,
        }
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of physical byte writes since creation
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl Medium for RamMedium {
    fn size(&self) -> u16 {
        self.data.len() as u16
    }

    fn read(&self, address: u16) -> Result<u8> {
        self.data
            .get(address as usize)
            .copied()
            .ok_or_else(|| StoreError::Medium(format!("read past end at {}", address)))
    }

    fn write(&mut self, address: u16, byte: u8) -> Result<()> {
        let slot = self
            .data
            .get_mut(address as usize)
            .ok_or_else(|| StoreError::Medium(format!("write past end at {}", address)))?;
        *slot = byte;
        self.writes += 1;
        Ok(())
    }
}
