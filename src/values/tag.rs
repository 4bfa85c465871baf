//! Tagged values
//!
//! A tag holds one of several value kinds in a fixed-size slot encoded
//! with bincode. Text tags are not persistable: their size is unbounded.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::medium::Medium;
use crate::store::{Persistent, PersistentStore, RecordId, ValueHandle};

use super::write_through;

/// Slot size: 4-byte variant index + 8-byte payload
pub const TAG_SIZE: u16 = 12;

/// Value of a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl TagValue {
    fn encode(&self) -> Result<Vec<u8>> {
        if let TagValue::Text(_) = self {
            return Err(StoreError::Unsupported(
                "text tags cannot be persisted".to_string(),
            ));
        }
        let mut bytes =
            bincode::serialize(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        bytes.resize(TAG_SIZE as usize, 0);
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// A persistent tag
#[derive(Debug)]
pub struct PersistentTag {
    handle: ValueHandle,
}

impl PersistentTag {
    /// Create an unstored tag with an initial value
    pub fn new(id: &str, init: TagValue) -> Result<Self> {
        let bytes = init.encode()?;
        Ok(Self {
            handle: ValueHandle::with_value(RecordId::user(id)?, &bytes),
        })
    }

    pub fn get(&self) -> Result<TagValue> {
        TagValue::decode(self.handle.bytes())
    }

    /// Set the tag and write it if it changed
    pub fn set<M: Medium>(&mut self, store: &mut PersistentStore<M>, value: TagValue) -> Result<()> {
        let bytes = value.encode()?;
        if bytes.as_slice() == self.handle.bytes() {
            return Ok(());
        }
        self.handle.bytes_mut().copy_from_slice(&bytes);
        write_through(store, self)
    }
}

impl Persistent for PersistentTag {
    fn handle(&self) -> &ValueHandle {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut ValueHandle {
        &mut self.handle
    }
}
