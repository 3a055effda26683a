//! Engine Module
//!
//! The collection registry and the opened store handle that coordinates
//! every component.
//!
//! ## Responsibilities
//! - Register collections before the store is opened
//! - Create collection directories on open
//! - Route save/get/delete through cache, record store and indexes
//! - Build and query secondary indexes
//!
//! ## Lifecycle
//! ```text
//! Registry::new() ──► register_collection(..)* ──► open(config) ──► Store
//!        ▲                                                         │
//!        └──────────────── clear() (test isolation) ──── shutdown() ◄┘
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::collection::Collection;
use crate::config::{CollectionOptions, Config};
use crate::error::{FsdbError, Result};
use crate::index::{IndexDefinition, SecondaryIndex};
use crate::path::PathResolver;
use crate::record::{Record, RecordKey};
use crate::storage::{DeleteOutcome, IdIter, RecordIter, RecordStore};

// =============================================================================
// Registry
// =============================================================================

/// Collections registered ahead of opening the store
#[derive(Debug, Default)]
pub struct Registry {
    collections: BTreeMap<String, CollectionOptions>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection with its cache options
    ///
    /// Fails with `Config` when the name is taken or cannot be used as a
    /// directory name.
    pub fn register_collection(
        &mut self,
        name: impl Into<String>,
        options: CollectionOptions,
    ) -> Result<()> {
        let name = name.into();
        validate_collection_name(&name)?;
        if self.collections.contains_key(&name) {
            return Err(FsdbError::Config(format!(
                "collection '{}' is already registered",
                name
            )));
        }
        self.collections.insert(name, options);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Forget every registered collection
    pub fn clear(&mut self) {
        self.collections.clear();
    }

    /// Open the store (initialize)
    ///
    /// On open:
    /// 1. Require at least one registered collection
    /// 2. Create each collection directory under `base_path`
    /// 3. Log each collection's record count
    /// 4. Build each collection's cache
    pub fn open(self, config: Config) -> Result<Store> {
        // Step 1: Nothing to open without collections
        if self.collections.is_empty() {
            return Err(FsdbError::Config(
                "at least one collection must be registered before opening".to_string(),
            ));
        }
        validate_file_extension(&config.file_extension)?;

        debug!(
            "opening store with base path {} and file ext {}",
            config.base_path.display(),
            config.file_extension
        );

        let store = RecordStore::new(&config);
        let mut collections = HashMap::with_capacity(self.collections.len());

        for (name, options) in self.collections {
            // Step 2: Create directory
            store.create_collection(&name)?;

            // Step 3: Report existing records
            info!("collection \"{}\": {} records", name, store.count(&name)?);

            // Step 4: Cache + empty index set
            let collection = Collection::open(&name, options, &store)?;
            collections.insert(name, collection);
        }

        Ok(Store {
            config,
            store,
            collections,
        })
    }
}

/// Collection names become directory names, so they must be a single
/// plain path component
fn validate_collection_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(FsdbError::Config(format!(
            "invalid collection name '{}'",
            name
        )));
    }
    Ok(())
}

/// The extension is appended to canonical ids, so it must be one plain
/// suffix: `{id}.{ext}`
fn validate_file_extension(extension: &str) -> Result<()> {
    let invalid = extension.is_empty()
        || extension.contains(['.', '/', '\\'])
        || extension.contains('\0');
    if invalid {
        return Err(FsdbError::Config(format!(
            "invalid file extension '{}'",
            extension
        )));
    }
    Ok(())
}

// =============================================================================
// Store
// =============================================================================

/// An opened document store
///
/// ## Concurrency Model
///
/// Each collection has one lock guarding its cache and indexes. Saves,
/// deletes and index builds hold it for their whole sequence
/// (write file → update cache → update indexes), so at most one writer
/// mutates a collection at a time and unique indexes hold. Different
/// collections never contend.
///
/// ## Keys
///
/// Records are addressed by their canonical id, the normalized form that
/// names the backing file. `get("a-b")` and `get("ab")` reach the same
/// record, ids returned by `record_ids` work with `get` and `delete`, and
/// the cache and indexes use the same keys as the disk. A save whose id
/// normalizes onto a file owned by a different raw id fails with
/// `IdCollision` and changes nothing.
///
/// ## Ordering
///
/// A save writes the record file *before* maintaining indexes. A
/// `UniqueConstraint` failure therefore leaves the new file on disk while
/// the index still holds the previous state; nothing is rolled back. Re-save
/// a corrected record (or delete it) to restore consistency.
///
/// Once the rename has replaced the file, the cache and indexes are updated
/// before the directory fsync runs. If that fsync fails the error is
/// returned, but memory already matches the file on disk.
pub struct Store {
    config: Config,
    store: RecordStore,
    collections: HashMap<String, Collection>,
}

impl Store {
    // =========================================================================
    // Records
    // =========================================================================

    /// Save a record, assigning an id if it has none
    ///
    /// Steps:
    /// 1. Acquire collection lock
    /// 2. Persist (atomic replace)
    /// 3. Refresh the cache entry if resident
    /// 4. Reindex
    /// 5. Fsync the collection directory
    pub fn save(&self, collection: &str, record: Record) -> Result<Record> {
        let coll = self.collection(collection)?;
        let start = Instant::now();

        // Step 1: Serialize writers on this collection
        let mut state = coll.lock();

        // Step 2: Write to disk first
        let record = self.store.write(collection, record)?;
        let id = PathResolver::canonical_id(&record)?;

        // Step 3: Keep a warm entry warm
        state.cache.replace_if_present(&id, &record);

        // Step 4: Update every index
        let reindexed = state.reindex_on_save(&id, &record);

        // Step 5: The file is already replaced; memory must follow it even
        // if the fsync fails
        if let Err(e) = self.store.sync_collection(collection) {
            warn!(collection, id = %id, "failed to sync collection directory: {}", e);
            return Err(e);
        }
        reindexed?;

        debug!(collection, id = %id, "save took {:?}", start.elapsed());
        Ok(record)
    }

    /// Get a record through the cache
    ///
    /// Fails with `NotFound` when the record is neither cached nor on disk.
    pub fn get<K: RecordKey + ?Sized>(&self, collection: &str, key: &K) -> Result<Record> {
        let coll = self.collection(collection)?;
        let id = PathResolver::canonical_id(key)?;
        let mut state = coll.lock();
        state.cache.get(&id)
    }

    /// Delete a record
    ///
    /// The cache entry and index entries are always dropped. A missing file
    /// is not an error (`DeleteOutcome::Absent`); any other I/O failure is
    /// returned after the indexes have been updated.
    pub fn delete<K: RecordKey + ?Sized>(&self, collection: &str, key: &K) -> Result<DeleteOutcome> {
        let coll = self.collection(collection)?;
        let id = PathResolver::canonical_id(key)?;
        let start = Instant::now();

        let mut state = coll.lock();

        state.cache.remove(&id);
        let outcome = self.store.delete(collection, id.as_str());
        if let Err(e) = &outcome {
            warn!(collection, id = %id, "failed to remove record file: {}", e);
        }
        state.reindex_on_delete(&id);

        debug!(collection, id = %id, "delete took {:?}", start.elapsed());
        outcome
    }

    /// Load a record from disk, bypassing the cache
    pub fn load_record<K: RecordKey + ?Sized>(&self, collection: &str, key: &K) -> Result<Record> {
        self.collection(collection)?;
        self.store.load_record(collection, key)
    }

    /// Decode the record file at an explicit path
    pub fn load_record_at(&self, path: &Path) -> Result<Record> {
        self.store.load(path)
    }

    /// Number of records stored in `collection`
    pub fn count(&self, collection: &str) -> Result<usize> {
        self.collection(collection)?;
        self.store.count(collection)
    }

    /// Every record of `collection`, decoded lazily from disk
    pub fn records(&self, collection: &str) -> Result<RecordIter> {
        self.collection(collection)?;
        self.store.records(collection)
    }

    /// Every record id of `collection` (normalized file names), no decoding
    pub fn record_ids(&self, collection: &str) -> Result<IdIter> {
        self.collection(collection)?;
        self.store.ids(collection)
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    /// Build a secondary index over the existing records of `collection`
    ///
    /// Replaces any index with the same name. If a unique violation is hit
    /// during the scan, the error is returned and the index stays installed
    /// in its partially built state.
    pub fn add_index(&self, collection: &str, definition: IndexDefinition) -> Result<()> {
        definition.validate()?;
        let coll = self.collection(collection)?;
        let start = Instant::now();

        let mut state = coll.lock();

        let description = format!(
            "{}, {}",
            if definition.unique { "unique" } else { "non-unique" },
            if definition.case_insensitive {
                "case-insensitive"
            } else {
                "case-sensitive"
            }
        );
        let fields = definition.fields.join(", ");
        let name = definition.name.clone();

        let index = state.install_index(SecondaryIndex::new(collection, definition));
        for record in self.store.records(collection)? {
            let record = record?;
            index.insert(&PathResolver::canonical_id(&record)?, &record)?;
        }

        info!(
            "added {} index '{}' to collection {} on fields: {}",
            description, name, collection, fields
        );
        debug!(collection, index = %name, "index build took {:?}", start.elapsed());
        Ok(())
    }

    /// Records whose indexed values match those in `values`
    ///
    /// `values` is a partial record holding the indexed fields. The matching
    /// ids are captured up front; each record is then fetched through the
    /// cache as the iterator advances.
    pub fn lookup(&self, collection: &str, index: &str, values: &Record) -> Result<IndexedRecords<'_>> {
        let coll = self.collection(collection)?;
        let ids = {
            let state = coll.lock();
            let index = state.indexes.get(index).ok_or_else(|| FsdbError::IndexNotFound {
                collection: collection.to_string(),
                index: index.to_string(),
            })?;
            index.lookup(values)
        };
        Ok(IndexedRecords {
            collection: coll,
            ids: ids.into_iter(),
        })
    }

    /// Names of the indexes defined on `collection`
    pub fn index_names(&self, collection: &str) -> Result<Vec<String>> {
        let coll = self.collection(collection)?;
        let state = coll.lock();
        Ok(state.indexes.keys().cloned().collect())
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Backing file of the record addressed by `key`
    pub fn record_path<K: RecordKey + ?Sized>(&self, collection: &str, key: &K) -> Result<PathBuf> {
        self.store.resolver().record_path(collection, key)
    }

    /// Directory of `collection`
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.store.resolver().collection_path(collection)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Whether the record with id `key` is cache-resident
    pub fn is_cached<K: RecordKey + ?Sized>(&self, collection: &str, key: &K) -> Result<bool> {
        let coll = self.collection(collection)?;
        let id = PathResolver::canonical_id(key)?;
        Ok(coll.lock().cache.contains(&id))
    }

    /// Number of cache-resident records in `collection`
    pub fn cached_len(&self, collection: &str) -> Result<usize> {
        Ok(self.collection(collection)?.lock().cache.len())
    }

    /// Cache-resident (canonical) ids of `collection`, most recently used first
    pub fn cached_ids(&self, collection: &str) -> Result<Vec<String>> {
        Ok(self.collection(collection)?.lock().cache.ids())
    }

    /// Names of all opened collections, sorted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Close the store, dropping caches and indexes
    ///
    /// Records are durable as soon as `save` returns, so there is nothing
    /// to flush.
    pub fn shutdown(self) {
        for coll in self.collections.values() {
            let mut state = coll.lock();
            debug!(
                collection = coll.name(),
                cached = state.cache.len(),
                indexes = state.indexes.len(),
                "closing collection"
            );
            state.cache.clear();
        }
        info!("store at {} closed", self.config.base_path.display());
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn collection(&self, name: &str) -> Result<&Collection> {
        self.collections
            .get(name)
            .ok_or_else(|| FsdbError::CollectionNotFound(name.to_string()))
    }
}

/// Lazy iterator over the records matched by an index lookup
pub struct IndexedRecords<'a> {
    collection: &'a Collection,
    ids: std::vec::IntoIter<String>,
}

impl Iterator for IndexedRecords<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        Some(self.collection.lock().cache.get(&id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}
