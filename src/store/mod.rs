//! Store Module
//!
//! Log-structured record storage on a byte-addressable medium.
//!
//! ## Layout
//! ```text
//! begin                                                         end
//! ┌──────────┬──────────────────┬─────┬──────────────────┬──────────┬─────────┐
//! │ "#>!"    │ Record           │ ... │ Record           │ "#<!"    │ (stale) │
//! │ header   │ id │ size │ val  │     │ id │ size │ val  │ footer   │         │
//! └──────────┴──────────────────┴─────┴──────────────────┴──────────┴─────────┘
//! ```
//!
//! - Records are only ever appended where the footer was, followed by a
//!   new footer.
//! - A record is keyed by its id AND its size: a key whose size changes is
//!   a different record.
//! - There is no delete. Space is reclaimed by rewriting the wanted
//!   records from the start of the range (`open_with(.., true)`).

mod engine;
mod handle;
mod id;
mod iterator;
mod record;
mod shared;

pub use engine::{PersistentStore, MIN_RANGE_SIZE};
pub use handle::{Persistent, ValueHandle};
pub use id::{RecordId, FOOTER_ID, HEADER_ID, ID_LEN};
pub use iterator::{RecordCursor, Records};
pub use record::{Record, RECORD_HEADER_LEN, SIZE_LEN};
pub use shared::SharedStore;
