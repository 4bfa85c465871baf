//! Fixed-capacity strings
//!
//! A string of capacity `N` is stored in `N + 1` bytes: up to `N` text
//! bytes followed by a NUL terminator. Longer values are truncated.

use crate::error::{Result, StoreError};
use crate::medium::Medium;
use crate::store::{Persistent, PersistentStore, RecordId, ValueHandle};

use super::write_through;

/// A persistent string with a fixed maximum length in bytes
#[derive(Debug)]
pub struct PersistentString {
    handle: ValueHandle,
}

impl PersistentString {
    /// Create an unstored string holding at most `max_len` bytes
    pub fn new(id: &str, max_len: u16, init: &str) -> Result<Self> {
        if max_len == u16::MAX {
            return Err(StoreError::Unsupported(format!(
                "string capacity {} leaves no room for a terminator",
                max_len
            )));
        }
        let mut value = Self {
            handle: ValueHandle::new(RecordId::user(id)?, max_len + 1),
        };
        value.fill(init);
        Ok(value)
    }

    /// Longest storable text, in bytes
    pub fn max_len(&self) -> usize {
        self.handle.bytes().len() - 1
    }

    /// Text up to the terminator
    ///
    /// Bytes that are not valid UTF-8 end the text.
    pub fn get(&self) -> &str {
        let bytes = self.handle.bytes();
        let text = &bytes[..bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())];
        match std::str::from_utf8(text) {
            Ok(text) => text,
            Err(e) => std::str::from_utf8(&text[..e.valid_up_to()]).unwrap_or_default(),
        }
    }

    /// Set the text, truncated to `max_len` bytes, and write it if it changed
    pub fn set<M: Medium>(&mut self, store: &mut PersistentStore<M>, value: &str) -> Result<()> {
        if self.get() == self.truncate(value) {
            return Ok(());
        }
        self.fill(value);
        write_through(store, self)
    }

    /// Longest prefix of `value` that fits, cut on a char boundary
    fn truncate<'a>(&self, value: &'a str) -> &'a str {
        let mut len = value.len().min(self.max_len());
        while !value.is_char_boundary(len) {
            len -= 1;
        }
        &value[..len]
    }

    /// Copy text and terminator; bytes after the terminator are untouched
    fn fill(&mut self, value: &str) {
        let text = self.truncate(value);
        let buffer = self.handle.bytes_mut();
        buffer[..text.len()].copy_from_slice(text.as_bytes());
        buffer[text.len()] = 0;
    }
}

impl Persistent for PersistentString {
    fn handle(&self) -> &ValueHandle {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut ValueHandle {
        &mut self.handle
    }
}
