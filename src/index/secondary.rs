//! Secondary index implementation.

use std::collections::{BTreeSet, HashMap};

use crate::error::{FsdbError, Result};
use crate::record::Record;

use super::{CompositeKey, IndexDefinition};

/// Hash-based secondary index for exact-match lookups.
///
/// Besides key → ids it keeps the reverse id → key map, so a record can be
/// dropped from its previous key even after its indexed fields changed.
pub struct SecondaryIndex {
    /// Owning collection (for error reporting)
    collection: String,
    /// Index definition
    definition: IndexDefinition,
    /// Composite key to record ids
    entries: HashMap<CompositeKey, BTreeSet<String>>,
    /// Record id to its current composite key
    keys_by_id: HashMap<String, CompositeKey>,
}

impl SecondaryIndex {
    /// Creates an empty index.
    pub fn new(collection: impl Into<String>, definition: IndexDefinition) -> Self {
        Self {
            collection: collection.into(),
            definition,
            entries: HashMap::new(),
            keys_by_id: HashMap::new(),
        }
    }

    pub fn definition(&self) -> &IndexDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Index `record` under its current field values, as `id`.
    ///
    /// `id` is the record's canonical (normalized) id, the same key the
    /// cache uses. If the record was already indexed under another key it
    /// is moved. Under a unique index a key held by a different record
    /// fails with `UniqueConstraint` and leaves the index unchanged.
    pub fn insert(&mut self, id: &str, record: &Record) -> Result<()> {
        let key = CompositeKey::derive(&self.definition, record);

        if self.definition.unique {
            let taken = self
                .entries
                .get(&key)
                .is_some_and(|ids| ids.iter().any(|other| other != id));
            if taken {
                return Err(FsdbError::UniqueConstraint {
                    collection: self.collection.clone(),
                    index: self.definition.name.clone(),
                    key: key.to_string(),
                });
            }
        }

        if self.keys_by_id.get(id) != Some(&key) {
            self.remove(id);
        }
        self.entries.entry(key.clone()).or_default().insert(id.to_string());
        self.keys_by_id.insert(id.to_string(), key);
        Ok(())
    }

    /// Drop the record with identifier `id`; absent ids are a no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(key) = self.keys_by_id.remove(id) else {
            return false;
        };
        if let Some(ids) = self.entries.get_mut(&key) {
            ids.remove(id);
            if ids.is_empty() {
                self.entries.remove(&key);
            }
        }
        true
    }

    /// Ids whose indexed values match those of `values`
    ///
    /// `values` is keyed exactly like an indexed record, so the transform
    /// and case folding apply to the query values as well.
    pub fn lookup(&self, values: &Record) -> Vec<String> {
        self.ids_for(&CompositeKey::derive(&self.definition, values))
    }

    /// Ids stored under `key` (empty if the key is absent)
    pub fn ids_for(&self, key: &CompositeKey) -> Vec<String> {
        self.entries
            .get(key)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Current key of the record with identifier `id`
    pub fn key_of(&self, id: &str) -> Option<&CompositeKey> {
        self.keys_by_id.get(id)
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.keys_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys_by_id.is_empty()
    }

    /// Number of distinct composite keys
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}
