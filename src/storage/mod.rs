//! Storage Module
//!
//! Persistent record store: one file per record, one directory per
//! collection.
//!
//! ## Responsibilities
//! - Load/save/delete single records through the configured codec
//! - Atomic replace on save (temp file + rename), so readers never see a
//!   partially written record
//! - Refuse to let a second raw id take over a file another id owns
//! - Count and enumerate the records of a collection
//!
//! ## Save Sequence
//! ```text
//! encode(record) ──► {id}.{ext}.tmp ──fsync──► rename ──► {id}.{ext}
//!                                                  │
//!                        (write ends here)         └──► fsync(dir)
//!                                                   (sync_collection)
//! ```
//! A crash at any point leaves either the previous version or nothing
//! (first write) at the final path, never a torn file.

mod iter;
mod store;

pub use iter::{IdIter, RecordIter};
pub use store::{DeleteOutcome, RecordStore};
