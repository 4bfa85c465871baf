//! File-backed medium
//!
//! Emulates an EEPROM with an image file. The whole image is kept in
//! memory; `commit` writes it back and syncs it to disk.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StoreError};

use super::{Medium, ERASED_BYTE};

/// Medium persisted in a single image file
#[derive(Debug)]
pub struct FileMedium {
    /// Path to the image file
    path: PathBuf,
    /// In-memory copy of the image
    image: Vec<u8>,
    /// Whether the image has writes not yet committed
    dirty: bool,
}

impl FileMedium {
    /// Open or create an image of `size` bytes
    ///
    /// A missing file starts erased. An existing file shorter than `size`
    /// is padded with erased bytes, a longer one is truncated in memory.
    pub fn open(path: &Path, size: u16) -> Result<Self> {
        if size == 0 {
            return Err(StoreError::Config(
                "medium size must be greater than zero".to_string(),
            ));
        }

        let (image, dirty) = if path.exists() {
            let mut image = fs::read(path)?;
            let resized = image.len() != size as usize;
            image.resize(size as usize, ERASED_BYTE);
            (image, resized)
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            (vec![ERASED_BYTE; size as usize], true)
        };

        debug!(path = %path.display(), size, "opened image");

        Ok(Self {
            path: path.to_path_buf(),
            image,
            dirty,
        })
    }

    /// Path of the image file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are uncommitted writes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Medium for FileMedium {
    fn size(&self) -> u16 {
        self.image.len() as u16
    }

    fn read(&self, address: u16) -> Result<u8> {
        self.image
            .get(address as usize)
            .copied()
            .ok_or_else(|| StoreError::Medium(format!("read past end at {}", address)))
    }

    fn write(&mut self, address: u16, byte: u8) -> Result<()> {
        let slot = self
            .image
            .get_mut(address as usize)
            .ok_or_else(|| StoreError::Medium(format!("write past end at {}", address)))?;
        *slot = byte;
        self.dirty = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(&self.image)?;
        file.sync_all()?;
        self.dirty = false;

        debug!(path = %self.path.display(), "committed image");
        Ok(())
    }
}
