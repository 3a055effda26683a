//! LRU record cache

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::config::{CollectionOptions, EvictionPolicy};
use crate::error::{FsdbError, Result};
use crate::record::Record;

use super::Loader;

/// Read-through LRU cache of records
///
/// With [`EvictionPolicy::Disabled`] nothing is ever resident and every
/// `get` goes to the loader.
pub struct RecordCache<L: Loader> {
    /// `None` when caching is disabled
    entries: Option<LruCache<String, Record>>,

    /// Miss handler
    loader: L,
}

impl<L: Loader> RecordCache<L> {
    /// Create a cache sized by `options`
    ///
    /// An LRU cache with zero capacity is a configuration error.
    pub fn new(options: CollectionOptions, loader: L) -> Result<Self> {
        let entries = match options.eviction {
            EvictionPolicy::Lru => {
                let capacity = NonZeroUsize::new(options.cache_capacity).ok_or_else(|| {
                    FsdbError::Config("LRU cache capacity must be greater than zero".to_string())
                })?;
                Some(LruCache::new(capacity))
            }
            EvictionPolicy::Disabled => None,
        };
        Ok(Self { entries, loader })
    }

    /// Get a record, loading and inserting it on miss
    ///
    /// Inserting past capacity evicts the least recently used entry.
    pub fn get(&mut self, id: &str) -> Result<Record> {
        let Some(entries) = self.entries.as_mut() else {
            return self.loader.load(id);
        };

        if let Some(record) = entries.get(id) {
            return Ok(record.clone());
        }

        let record = self.loader.load(id)?;
        entries.put(id.to_string(), record.clone());
        Ok(record)
    }

    /// Replace a resident entry with a newer version
    ///
    /// Returns `false` (and leaves the cache untouched) when `id` is not
    /// resident; the next `get` will read through.
    pub fn replace_if_present(&mut self, id: &str, record: &Record) -> bool {
        match self.entries.as_mut().and_then(|entries| entries.get_mut(id)) {
            Some(slot) => {
                *slot = record.clone();
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `id`, if resident
    pub fn remove(&mut self, id: &str) -> Option<Record> {
        self.entries.as_mut()?.pop(id)
    }

    /// Whether `id` is resident (does not touch recency)
    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|entries| entries.contains(id))
    }

    /// Number of resident records
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident records (0 when disabled)
    pub fn capacity(&self) -> usize {
        self.entries
            .as_ref()
            .map_or(0, |entries| entries.cap().get())
    }

    /// Resident ids, most recently used first
    pub fn ids(&self) -> Vec<String> {
        self.entries
            .as_ref()
            .map(|entries| entries.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    /// Drop every resident record
    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}
