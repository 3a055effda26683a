//! Collection state
//!
//! Everything the store keeps in memory for one collection: its record
//! cache and its secondary indexes. Both sit behind a single lock so a
//! save or delete and the index maintenance that follows it happen as one
//! critical section.

use std::collections::btree_map::{BTreeMap, Entry};

use parking_lot::{Mutex, MutexGuard};

use crate::cache::{Loader, RecordCache};
use crate::config::CollectionOptions;
use crate::error::Result;
use crate::index::SecondaryIndex;
use crate::record::Record;
use crate::storage::RecordStore;

/// Cache miss handler: loads records of one collection from disk
///
/// Cache keys are canonical ids, which normalize to themselves, so they
/// resolve to the same file as the raw id they came from.
pub(crate) struct CollectionLoader {
    store: RecordStore,
    collection: String,
}

impl Loader for CollectionLoader {
    fn load(&self, id: &str) -> Result<Record> {
        self.store.load_record(&self.collection, id)
    }
}

/// A registered, opened collection
pub(crate) struct Collection {
    name: String,
    state: Mutex<CollectionState>,
}

/// Mutable state guarded by the collection lock
pub(crate) struct CollectionState {
    pub(crate) cache: RecordCache<CollectionLoader>,
    pub(crate) indexes: BTreeMap<String, SecondaryIndex>,
}

impl Collection {
    pub(crate) fn open(name: &str, options: CollectionOptions, store: &RecordStore) -> Result<Self> {
        let loader = CollectionLoader {
            store: store.clone(),
            collection: name.to_string(),
        };
        Ok(Self {
            name: name.to_string(),
            state: Mutex::new(CollectionState {
                cache: RecordCache::new(options, loader)?,
                indexes: BTreeMap::new(),
            }),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Acquire the collection lock
    pub(crate) fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock()
    }
}

impl CollectionState {
    /// Install `index`, replacing any index of the same name
    pub(crate) fn install_index(&mut self, index: SecondaryIndex) -> &mut SecondaryIndex {
        match self.indexes.entry(index.name().to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(index);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(index),
        }
    }

    /// Move `record` (canonical id `id`) to the keys its current values map
    /// to, in every index
    ///
    /// Stops at the first unique violation; indexes already updated stay
    /// updated.
    pub(crate) fn reindex_on_save(&mut self, id: &str, record: &Record) -> Result<()> {
        for index in self.indexes.values_mut() {
            index.insert(id, record)?;
        }
        Ok(())
    }

    /// Drop the record with canonical id `id` from every index
    pub(crate) fn reindex_on_delete(&mut self, id: &str) {
        for index in self.indexes.values_mut() {
            index.remove(id);
        }
    }
}
