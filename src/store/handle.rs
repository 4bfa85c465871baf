//! Value handles
//!
//! A handle is the in-memory side of one logical key: its id, declared
//! size, last known address and a private buffer. The store reads into and
//! writes from the buffer but never owns it.

use super::id::RecordId;

/// In-memory representation of one logical key
#[derive(Debug, PartialEq, Eq)]
pub struct ValueHandle {
    id: RecordId,
    /// Address of the stored record, `None` until stored or found
    address: Option<u16>,
    buffer: Box<[u8]>,
}

impl ValueHandle {
    /// Create an unstored handle of `size` zeroed bytes
    ///
    /// The id is not validated here so that handles can also describe raw
    /// records (see [`PersistentStore::load`](super::PersistentStore::load)).
    /// The store refuses to write a handle with a reserved id, failing
    /// with `InvalidId` before touching the medium. Use
    /// [`RecordId::user`] to validate an id up front.
    pub fn new(id: RecordId, size: u16) -> Self {
        Self {
            id,
            address: None,
            buffer: vec![0u8; size as usize].into_boxed_slice(),
        }
    }

    /// Create an unstored handle initialized with `value`
    ///
    /// The declared size is `value.len()`, capped at `u16::MAX`.
    pub fn with_value(id: RecordId, value: &[u8]) -> Self {
        let len = value.len().min(u16::MAX as usize);
        Self {
            id,
            address: None,
            buffer: value[..len].into(),
        }
    }

    pub(crate) fn stored(id: RecordId, address: u16, value: &[u8]) -> Self {
        Self {
            id,
            address: Some(address),
            buffer: value.into(),
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Declared size; part of the key identity
    pub fn size(&self) -> u16 {
        self.buffer.len() as u16
    }

    pub fn address(&self) -> Option<u16> {
        self.address
    }

    pub fn is_stored(&self) -> bool {
        self.address.is_some()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Same id and same size
    pub fn matches(&self, other: &ValueHandle) -> bool {
        self.matches_key(other.id, other.size())
    }

    pub(crate) fn matches_key(&self, id: RecordId, size: u16) -> bool {
        self.id == id && self.size() == size
    }

    pub(crate) fn set_address(&mut self, address: Option<u16>) {
        self.address = address;
    }
}

/// Anything the store can persist
///
/// Typed values wrap a [`ValueHandle`] and expose it through this trait;
/// the store only ever touches the handle.
pub trait Persistent {
    fn handle(&self) -> &ValueHandle;
    fn handle_mut(&mut self) -> &mut ValueHandle;
}

impl Persistent for ValueHandle {
    fn handle(&self) -> &ValueHandle {
        self
    }

    fn handle_mut(&mut self) -> &mut ValueHandle {
        self
    }
}
