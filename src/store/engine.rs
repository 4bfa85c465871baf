//! Persistent Store
//!
//! The engine that owns the managed range and runs the scan, append,
//! lookup and compaction algorithms on top of a [`Medium`].
//!
//! ## Responsibilities
//! - Format a range on first use (header + footer)
//! - Scan records to find the end of the store
//! - Append, find and update records with write-if-different
//! - Reconcile the stored keys with a desired key set (append or rewrite)

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::medium::Medium;

use super::handle::{Persistent, ValueHandle};
use super::id::{RecordId, FOOTER_ID, HEADER_ID, ID_LEN};
use super::iterator::{RecordCursor, Records};
use super::record::{self, Record, RECORD_HEADER_LEN, SIZE_LEN};

/// Smallest range worth managing: header + footer + slack
pub const MIN_RANGE_SIZE: u16 = 12;

/// What a scan visitor wants next
enum ScanFlow {
    Continue,
    Stop,
}

/// Log-structured key/value store over a byte-addressable medium
///
/// ## Concurrency
/// Single-threaded: every operation runs to completion and mutating
/// operations take `&mut self`. Use [`SharedStore`](super::SharedStore)
/// to share one store between threads.
pub struct PersistentStore<M: Medium> {
    /// Backing medium
    medium: M,

    /// First managed address (header position)
    begin: u16,

    /// End of the managed range (exclusive)
    end: u16,

    /// Where the next record goes, `None` until a successful `open`
    next_write: Option<u16>,

    /// Commit the medium after every mutating operation
    auto_commit: bool,

    /// Rewrite when a desired key is stored with a different size
    rewrite_on_resize: bool,
}

impl<M: Medium> PersistentStore<M> {
    /// Create a store over the range requested by `config`
    ///
    /// The range is clamped to the medium. A range smaller than
    /// [`MIN_RANGE_SIZE`] falls back to the whole medium.
    pub fn new(medium: M, config: &Config) -> Self {
        let size = medium.size();
        let mut begin = config.begin.unwrap_or(0);
        let mut end = config.end.unwrap_or(size);

        if begin >= size {
            begin = 0;
        }
        if end > size {
            end = size;
        }
        if end < begin || end - begin < MIN_RANGE_SIZE {
            warn!(
                begin,
                end, "requested range too small, using the whole medium"
            );
            begin = 0;
            end = size;
        }

        debug!(begin, end, "store range");

        Self {
            medium,
            begin,
            end,
            next_write: None,
            auto_commit: config.auto_commit,
            rewrite_on_resize: config.rewrite_on_resize,
        }
    }

    /// Open the store without changing stored values
    ///
    /// Formats the range if it carries no header, then scans it.
    /// Returns the number of stored records.
    pub fn open(&mut self) -> Result<usize> {
        self.next_write = None;

        let header = self.read_id(self.begin).map_err(|e| {
            error!(error = %e, "open failed reading header");
            e
        })?;

        if header != HEADER_ID {
            info!(begin = self.begin, end = self.end, "formatting store");
            self.write_id(self.begin as u32, HEADER_ID)
                .and_then(|_| self.write_id(self.first_record_address() as u32, FOOTER_ID))
                .and_then(|_| self.commit_if_auto())
                .map_err(|e| {
                    error!(error = %e, "open failed formatting store");
                    e
                })?;
        }

        let (count, end_of_records) = self
            .scan(|_, _, _| Ok(ScanFlow::Continue))
            .map_err(|e| {
                error!(error = %e, "open failed scanning records");
                e
            })?;

        self.next_write = Some(end_of_records);
        info!(count, next_write = end_of_records, "store opened");
        Ok(count)
    }

    /// Open the store and reconcile it with the `desired` values
    ///
    /// Stored records matching a desired value (same id and size) are
    /// loaded into it. If `remove_unused` is set and records not in
    /// `desired` are stored, the store is rewritten from scratch with the
    /// desired values in order. Otherwise only new values are appended.
    ///
    /// Returns the number of records stored before reconciliation.
    pub fn open_with(
        &mut self,
        desired: &mut [&mut dyn Persistent],
        remove_unused: bool,
    ) -> Result<usize> {
        for (i, value) in desired.iter().enumerate() {
            let handle = value.handle();
            if handle.id().is_reserved() {
                return Err(StoreError::InvalidId(format!(
                    "'{}' is reserved for the store layout",
                    handle.id()
                )));
            }
            if desired[..i].iter().any(|other| other.handle().matches(handle)) {
                return Err(StoreError::DuplicateKey(format!(
                    "'{}' ({} bytes)",
                    handle.id(),
                    handle.size()
                )));
            }
        }

        let stored = self.open()?;

        for value in desired.iter_mut() {
            value.handle_mut().set_address(None);
        }

        // Match stored records to desired values
        let mut found = 0usize;
        let mut resized = false;
        self.scan(|id, size, address| {
            let candidate = desired
                .iter_mut()
                .map(|value| value.handle_mut())
                .find(|handle| !handle.is_stored() && handle.matches_key(id, size));

            match candidate {
                Some(handle) => {
                    self.read_bytes(record::value_address(address), handle.bytes_mut())?;
                    handle.set_address(Some(address));
                    found += 1;
                }
                None => {
                    let resized_key = desired
                        .iter()
                        .map(|value| value.handle())
                        .find(|handle| handle.id() == id && handle.size() != size);
                    if let Some(handle) = resized_key {
                        warn!(
                            id = %id,
                            stored_size = size,
                            desired_size = handle.size(),
                            "stored value changed size, treating it as a new key"
                        );
                        resized = true;
                    }
                }
            }
            Ok(ScanFlow::Continue)
        })?;

        let rewrite = (remove_unused && stored > found) || (self.rewrite_on_resize && resized);

        if rewrite {
            let first = self.first_record_address();
            let len = desired
                .iter()
                .map(|value| (RECORD_HEADER_LEN + value.handle().size() as usize) as u32)
                .sum::<u32>()
                + ID_LEN as u32;
            self.check_range(first as u32, len)?;

            info!(stored, found, desired = desired.len(), "rewriting store");
            self.next_write = Some(first);
            if desired.is_empty() {
                self.write_id(first as u32, FOOTER_ID)?;
            }
            for value in desired.iter_mut() {
                self.append_handle(value.handle_mut())?;
            }
        } else {
            for value in desired.iter_mut() {
                let handle = value.handle_mut();
                if !handle.is_stored() {
                    self.append_handle(handle)?;
                }
            }
        }

        self.commit_if_auto()?;
        Ok(stored)
    }

    /// Drop every record with `id` by rewriting the store
    ///
    /// Leftover copies of the same key collapse to the first one. Returns
    /// the number of records dropped.
    pub fn remove(&mut self, id: RecordId) -> Result<usize> {
        let mut values = Vec::new();
        let stored = self.load(&mut values)?;

        let mut seen = HashSet::new();
        values.retain(|value| value.id() != id && seen.insert((value.id(), value.size())));

        let mut desired: Vec<&mut dyn Persistent> = values
            .iter_mut()
            .map(|value| value as &mut dyn Persistent)
            .collect();
        self.open_with(&mut desired, true)?;

        Ok(stored - values.len())
    }

    /// Look up a value by id and size
    ///
    /// On a match the stored bytes are read into the value and its address
    /// is set. Returns whether a match was found.
    pub fn find<V: Persistent + ?Sized>(&self, value: &mut V) -> Result<bool> {
        self.ensure_initialized()?;

        let handle = value.handle_mut();
        let (id, size) = (handle.id(), handle.size());

        let mut hit = None;
        self.scan(|stored_id, stored_size, address| {
            if stored_id == id && stored_size == size {
                hit = Some(address);
                return Ok(ScanFlow::Stop);
            }
            Ok(ScanFlow::Continue)
        })?;

        match hit {
            Some(address) => {
                self.read_bytes(record::value_address(address), handle.bytes_mut())?;
                handle.set_address(Some(address));
                debug!(id = %id, address, "found value");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Make sure a value is stored
    ///
    /// A stored match is loaded into the value; otherwise the value is
    /// appended with its current bytes.
    pub fn add<V: Persistent + ?Sized>(&mut self, value: &mut V) -> Result<()> {
        if self.find(value)? {
            return Ok(());
        }
        self.append_handle(value.handle_mut())?;
        self.commit_if_auto()
    }

    /// Append a value at the end of the store
    ///
    /// Fails with `DuplicateKey` if a record with the same id and size is
    /// already stored; use [`add`](Self::add) to load it instead.
    pub fn append<V: Persistent + ?Sized>(&mut self, value: &mut V) -> Result<()> {
        self.ensure_initialized()?;

        let handle = value.handle_mut();
        let (id, size) = (handle.id(), handle.size());
        let mut duplicate = false;
        self.scan(|stored_id, stored_size, _| {
            duplicate = stored_id == id && stored_size == size;
            Ok(if duplicate { ScanFlow::Stop } else { ScanFlow::Continue })
        })?;
        if duplicate {
            return Err(StoreError::DuplicateKey(format!("'{}' ({} bytes)", id, size)));
        }

        self.append_handle(handle)?;
        self.commit_if_auto()
    }

    /// Write a stored value's bytes back to the medium
    ///
    /// Only bytes that differ from the medium are written.
    pub fn update<V: Persistent + ?Sized>(&mut self, value: &V) -> Result<()> {
        self.ensure_initialized()?;

        let handle = value.handle();
        let address = handle.address().ok_or(StoreError::NotStored)?;

        match self.read_header(address)? {
            Some((id, size)) if handle.matches_key(id, size) => {}
            _ => {
                error!(id = %handle.id(), address, "update through a stale handle");
                return Err(StoreError::StaleHandle {
                    id: handle.id().to_string(),
                    address,
                });
            }
        }

        self.update_bytes(record::value_address(address), handle.bytes())?;
        self.commit_if_auto()
    }

    /// Load every stored record into `values`
    ///
    /// Returns the number of loaded records.
    pub fn load(&self, values: &mut Vec<ValueHandle>) -> Result<usize> {
        let mut count = 0;
        for record in self.records() {
            let record = record?;
            values.push(ValueHandle::stored(record.id, record.address, &record.value));
            count += 1;
        }
        Ok(count)
    }

    /// Count stored records without reading their values
    pub fn count(&self) -> Result<usize> {
        self.ensure_initialized()?;
        let (count, _) = self.scan(|_, _, _| Ok(ScanFlow::Continue))?;
        Ok(count)
    }

    /// Advance `cursor` to the next record
    ///
    /// Starts at the first record on a fresh or reset cursor. Returns
    /// `None` once the footer is reached.
    pub fn iterate<'c>(&self, cursor: &'c mut RecordCursor) -> Result<Option<&'c Record>> {
        self.ensure_initialized()?;

        if cursor.is_finished() {
            return Ok(None);
        }

        let address = match cursor.take() {
            None => self.first_record_address(),
            Some(previous) => previous.next_address() as u16,
        };

        match self.read_record(address) {
            Ok(Some(record)) => Ok(Some(cursor.set(record))),
            Ok(None) => {
                cursor.finish();
                Ok(None)
            }
            Err(e) => {
                cursor.finish();
                Err(e)
            }
        }
    }

    /// Iterate over all stored records, first to last
    pub fn records(&self) -> Records<'_, M> {
        Records::new(self)
    }

    /// Reset the store to empty
    ///
    /// Stale bytes past the new footer are left in place.
    pub fn clear(&mut self) -> Result<()> {
        let first = self.first_record_address();
        let result = self
            .write_id(self.begin as u32, HEADER_ID)
            .and_then(|_| self.write_id(first as u32, FOOTER_ID))
            .and_then(|_| self.commit_if_auto());

        match result {
            Ok(()) => {
                self.next_write = Some(first);
                info!("store cleared");
                Ok(())
            }
            Err(e) => {
                self.next_write = None;
                error!(error = %e, "clear failed");
                Err(e)
            }
        }
    }

    /// Make pending medium writes durable
    pub fn commit(&mut self) -> Result<()> {
        self.medium.commit()
    }

    /// CRC-32 of the header, all records and the footer
    pub fn checksum(&self) -> Result<u32> {
        let next_write = self.next_write.ok_or(StoreError::NotInitialized)?;
        let len = (next_write - self.begin) as usize + ID_LEN;

        let mut bytes = vec![0u8; len];
        self.read_bytes(self.begin as u32, &mut bytes)?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&bytes);
        Ok(hasher.finalize())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether `open` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.next_write.is_some()
    }

    /// Managed range `[begin, end)`
    pub fn range(&self) -> (u16, u16) {
        (self.begin, self.end)
    }

    /// Address of the current footer
    pub fn next_write_address(&self) -> Option<u16> {
        self.next_write
    }

    /// Bytes left for new records (each also needs an id and size field)
    pub fn free_space(&self) -> Option<usize> {
        self.next_write
            .map(|next| (self.end as usize).saturating_sub(next as usize + ID_LEN))
    }

    /// Backing medium, read-only
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Give the medium back, dropping the store state
    pub fn into_medium(self) -> M {
        self.medium
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn first_record_address(&self) -> u16 {
        self.begin + ID_LEN as u16
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.next_write.is_none() {
            error!("store not initialized");
            return Err(StoreError::NotInitialized);
        }
        Ok(())
    }

    fn commit_if_auto(&mut self) -> Result<()> {
        if self.auto_commit {
            self.medium.commit()?;
        }
        Ok(())
    }

    /// Walk the records from the first one until the footer
    ///
    /// Returns the number of visited records and the address right after
    /// the last one, or where the visitor stopped.
    fn scan<F>(&self, mut visit: F) -> Result<(usize, u16)>
    where
        F: FnMut(RecordId, u16, u16) -> Result<ScanFlow>,
    {
        let mut address = self.first_record_address();
        let mut count = 0;

        while let Some((id, size)) = self.read_header(address)? {
            count += 1;
            if let ScanFlow::Stop = visit(id, size, address)? {
                break;
            }
            address = record::next_address(address, size) as u16;
        }

        Ok((count, address))
    }

    /// Read the id and size of the record at `address`
    ///
    /// `None` at the footer. A record that would not leave room for a
    /// footer before the end of the range is treated as the footer.
    fn read_header(&self, address: u16) -> Result<Option<(RecordId, u16)>> {
        let id = match self.read_id(address) {
            Ok(id) => id,
            Err(StoreError::OutOfRange { .. }) => {
                warn!(address, "no footer before end of range");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if id == FOOTER_ID {
            return Ok(None);
        }

        let mut size_bytes = [0u8; SIZE_LEN];
        match self.read_bytes(record::size_address(address), &mut size_bytes) {
            Ok(()) => {}
            Err(StoreError::OutOfRange { .. }) => {
                warn!(address, id = %id, "truncated record header");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        let size = record::decode_size(size_bytes);

        if record::next_address(address, size) + ID_LEN as u32 > self.end as u32 {
            warn!(address, id = %id, size, "record overruns range, treating as end of store");
            return Ok(None);
        }

        Ok(Some((id, size)))
    }

    /// Materialize the record at `address`
    fn read_record(&self, address: u16) -> Result<Option<Record>> {
        let Some((id, size)) = self.read_header(address)? else {
            return Ok(None);
        };

        let mut value = vec![0u8; size as usize];
        self.read_bytes(record::value_address(address), &mut value)?;

        Ok(Some(Record {
            id,
            address,
            value: value.into(),
        }))
    }

    /// Write a record and a fresh footer at the end of the store
    fn append_handle(&mut self, handle: &mut ValueHandle) -> Result<()> {
        let address = self.next_write.ok_or(StoreError::NotInitialized)?;

        if handle.id().is_reserved() {
            return Err(StoreError::InvalidId(format!(
                "'{}' is reserved for the store layout",
                handle.id()
            )));
        }

        let next = record::next_address(address, handle.size());
        self.check_range(address as u32, next - address as u32 + ID_LEN as u32)?;

        let result = self
            .write_id(address as u32, handle.id())
            .and_then(|_| {
                self.update_bytes(
                    record::size_address(address),
                    &record::encode_size(handle.size()),
                )
            })
            .and_then(|_| self.update_bytes(record::value_address(address), handle.bytes()))
            .and_then(|_| self.write_id(next, FOOTER_ID));

        match result {
            Ok(()) => {
                handle.set_address(Some(address));
                self.next_write = Some(next as u16);
                debug!(id = %handle.id(), address, size = handle.size(), "appended value");
                Ok(())
            }
            Err(e) => {
                handle.set_address(None);
                error!(id = %handle.id(), address, error = %e, "append failed");
                Err(e)
            }
        }
    }

    fn check_range(&self, address: u32, len: u32) -> Result<()> {
        if address < self.begin as u32 || address + len > self.end as u32 {
            error!(
                begin = self.begin,
                address,
                len,
                end = self.end,
                "address out of range"
            );
            return Err(StoreError::OutOfRange {
                address,
                len,
                begin: self.begin,
                end: self.end,
            });
        }
        Ok(())
    }

    fn read_id(&self, address: u16) -> Result<RecordId> {
        let mut bytes = [0u8; ID_LEN];
        self.read_bytes(address as u32, &mut bytes)?;
        Ok(RecordId::from_bytes(bytes))
    }

    fn write_id(&mut self, address: u32, id: RecordId) -> Result<()> {
        self.update_bytes(address, id.as_bytes())
    }

    fn read_bytes(&self, address: u32, bytes: &mut [u8]) -> Result<()> {
        self.check_range(address, bytes.len() as u32)?;
        for (offset, byte) in bytes.iter_mut().enumerate() {
            *byte = self.medium.read((address + offset as u32) as u16)?;
        }
        Ok(())
    }

    /// Write only the bytes that differ from the medium
    fn update_bytes(&mut self, address: u32, bytes: &[u8]) -> Result<()> {
        self.check_range(address, bytes.len() as u32)?;
        for (offset, &byte) in bytes.iter().enumerate() {
            let target = (address + offset as u32) as u16;
            if self.medium.read(target)? != byte {
                self.medium.write(target, byte)?;
            }
        }
        Ok(())
    }
}
