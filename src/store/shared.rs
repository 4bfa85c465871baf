//! Shared store
//!
//! Serializes every store operation on one mutex so a store can be used
//! from several threads. The engine's end-of-store cursor is not safe for
//! concurrent mutation, so even reads take the lock.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::medium::Medium;

use super::engine::PersistentStore;
use super::handle::{Persistent, ValueHandle};
use super::id::RecordId;

/// Cloneable handle to a mutex-protected store
pub struct SharedStore<M: Medium> {
    inner: Arc<Mutex<PersistentStore<M>>>,
}

impl<M: Medium> Clone for SharedStore<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Medium> SharedStore<M> {
    pub fn new(store: PersistentStore<M>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, PersistentStore<M>> {
        self.inner.lock()
    }

    pub fn open(&self) -> Result<usize> {
        self.inner.lock().open()
    }

    pub fn open_with(
        &self,
        desired: &mut [&mut dyn Persistent],
        remove_unused: bool,
    ) -> Result<usize> {
        self.inner.lock().open_with(desired, remove_unused)
    }

    pub fn find<V: Persistent + ?Sized>(&self, value: &mut V) -> Result<bool> {
        self.inner.lock().find(value)
    }

    pub fn add<V: Persistent + ?Sized>(&self, value: &mut V) -> Result<()> {
        self.inner.lock().add(value)
    }

    pub fn update<V: Persistent + ?Sized>(&self, value: &V) -> Result<()> {
        self.inner.lock().update(value)
    }

    pub fn remove(&self, id: RecordId) -> Result<usize> {
        self.inner.lock().remove(id)
    }

    pub fn load(&self, values: &mut Vec<ValueHandle>) -> Result<usize> {
        self.inner.lock().load(values)
    }

    pub fn count(&self) -> Result<usize> {
        self.inner.lock().count()
    }

    pub fn clear(&self) -> Result<()> {
        self.inner.lock().clear()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().is_initialized()
    }
}
