//! Values Module
//!
//! Typed wrappers around [`ValueHandle`](crate::store::ValueHandle).
//!
//! Each wrapper keeps a typed view of its handle's buffer and writes
//! changes through to the store. The store itself only sees the handle.
//!
//! ```no_run
//! use pstore::{Config, PersistentStore, Persistent};
//! use pstore::medium::RamMedium;
//! use pstore::values::{PersistentF32, PersistentString, PersistentU16};
//!
//! # fn main() -> pstore::Result<()> {
//! let mut store = PersistentStore::new(RamMedium::new(1024), &Config::default());
//!
//! let mut counter = PersistentU16::new("i_v", 16)?;
//! let mut ratio = PersistentF32::new("f_v", 55.3)?;
//! let mut text = PersistentString::new("txt", 10, "Hello!")?;
//! store.open_with(&mut [&mut counter, &mut ratio, &mut text], true)?;
//!
//! counter.set(&mut store, 44)?;
//! text.set(&mut store, "Got new value!")?; // truncated to 10 bytes
//! # Ok(())
//! # }
//! ```

mod scalar;
mod tag;
mod text;

pub use scalar::{
    PersistentBool, PersistentF32, PersistentF64, PersistentI16, PersistentI32, PersistentI64,
    PersistentI8, PersistentScalar, PersistentU16, PersistentU32, PersistentU64, PersistentU8,
    Scalar,
};
pub use tag::{PersistentTag, TagValue, TAG_SIZE};
pub use text::PersistentString;

use crate::error::Result;
use crate::medium::Medium;
use crate::store::{Persistent, PersistentStore};

/// Push a changed buffer to the store
///
/// Values not stored yet only change in memory; their current bytes are
/// written when they are added.
fn write_through<M: Medium, V: Persistent>(store: &mut PersistentStore<M>, value: &V) -> Result<()> {
    if value.handle().is_stored() {
        store.update(value)
    } else {
        Ok(())
    }
}
