//! Record iteration
//!
//! Sequential, restartable traversal of the stored records.

use crate::error::Result;
use crate::medium::Medium;

use super::engine::PersistentStore;
use super::record::Record;

/// Position of an ongoing traversal
///
/// Holds at most one materialized record; advancing or resetting the
/// cursor drops it.
#[derive(Debug, Default)]
pub struct RecordCursor {
    current: Option<Record>,
    finished: bool,
}

impl RecordCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record returned by the last `iterate` call
    pub fn current(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    /// Whether the footer has been reached
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Restart from the first record
    pub fn reset(&mut self) {
        self.current = None;
        self.finished = false;
    }

    pub(super) fn take(&mut self) -> Option<Record> {
        self.current.take()
    }

    pub(super) fn set(&mut self, record: Record) -> &Record {
        self.current.insert(record)
    }

    pub(super) fn finish(&mut self) {
        self.current = None;
        self.finished = true;
    }
}

/// Iterator over stored records in storage order
pub struct Records<'a, M: Medium> {
    store: &'a PersistentStore<M>,
    cursor: RecordCursor,
}

impl<'a, M: Medium> Records<'a, M> {
    pub(super) fn new(store: &'a PersistentStore<M>) -> Self {
        Self {
            store,
            cursor: RecordCursor::new(),
        }
    }
}

impl<'a, M: Medium> Iterator for Records<'a, M> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.store.iterate(&mut self.cursor) {
            Ok(Some(record)) => Some(Ok(record.clone())),
            Ok(None) => None,
            // iterate() finished the cursor, so this is the last item
            Err(e) => Some(Err(e)),
        }
    }
}
