//! Cache Module
//!
//! Bounded, read-through record cache (one per collection).
//!
//! ## Responsibilities
//! - Hold up to `cache_capacity` most recently used records
//! - Read through to a [`Loader`] on miss, then insert
//! - Stay warm on save (replace resident entries only)
//! - Drop entries unconditionally on delete
//!
//! ## Data Structure Choice
//! `lru::LruCache` keyed by the canonical (normalized) record id: O(1)
//! get/put/evict.

mod lru_cache;

use crate::error::Result;
use crate::record::Record;

pub use lru_cache::RecordCache;

/// Miss handler of a read-through cache
pub trait Loader {
    /// Load the record with identifier `id` from the backing store
    fn load(&self, id: &str) -> Result<Record>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> Result<Record>,
{
    fn load(&self, id: &str) -> Result<Record> {
        self(id)
    }
}
