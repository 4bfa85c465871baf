//! Medium Module
//!
//! Byte-addressable non-volatile storage the store is layered on.
//!
//! ## Responsibilities
//! - Expose a fixed address space `[0, size)`
//! - Read and write single bytes
//! - Optionally make pending writes durable (`commit`)
//!
//! The medium knows nothing about records: no directory, no filesystem,
//! no wear-leveling. Wear is minimized one level up, by the store only
//! writing bytes that differ from what is already there.

mod file;
mod ram;

pub use file::FileMedium;
pub use ram::RamMedium;

use crate::error::Result;

/// Value of a byte that has never been written
pub const ERASED_BYTE: u8 = 0xFF;

/// Random-access byte storage
pub trait Medium {
    /// Number of addressable bytes
    fn size(&self) -> u16;

    /// Read the byte at `address`
    fn read(&self, address: u16) -> Result<u8>;

    /// Write `byte` at `address`
    fn write(&mut self, address: u16, byte: u8) -> Result<()>;

    /// Make all writes so far durable
    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<M: Medium + ?Sized> Medium for Box<M> {
    fn size(&self) -> u16 {
        (**self).size()
    }

    fn read(&self, address: u16) -> Result<u8> {
        (**self).read(address)
    }

    fn write(&mut self, address: u16, byte: u8) -> Result<()> {
        (**self).write(address, byte)
    }

    fn commit(&mut self) -> Result<()> {
        (**self).commit()
    }
}
