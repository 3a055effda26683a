//! Record Store
//!
//! Reads, writes and deletes the backing file of each record.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::codec::Codec;
use crate::config::Config;
use crate::error::{FsdbError, Result};
use crate::id::IdGenerator;
use crate::path::PathResolver;
use crate::record::{Record, RecordKey};

use super::{IdIter, RecordIter};

/// Result of removing a record file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The file existed and was removed
    Removed,

    /// There was nothing to remove
    Absent,
}

/// Persistent record store
///
/// Stateless apart from its configuration; all state lives on disk, so every
/// method takes `&self`.
#[derive(Debug, Clone)]
pub struct RecordStore {
    resolver: PathResolver,
    codec: Arc<dyn Codec>,
    id_generator: Arc<dyn IdGenerator>,
    sync_writes: bool,
}

impl RecordStore {
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: PathResolver::new(&config.base_path, &config.file_extension),
            codec: Arc::clone(&config.codec),
            id_generator: Arc::clone(&config.id_generator),
            sync_writes: config.sync_writes,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Create the collection directory if it does not exist yet
    pub fn create_collection(&self, collection: &str) -> Result<()> {
        fs::create_dir_all(self.resolver.collection_path(collection))?;
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Decode the record stored at an explicit path
    ///
    /// Returns:
    /// - `Err(NotFound)` — no file at `path`
    /// - `Err(Decode)` — the bytes are not a valid record
    pub fn load(&self, path: &Path) -> Result<Record> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(not_found_at(path));
            }
            Err(e) => return Err(e.into()),
        };
        self.codec.decode(&bytes)
    }

    /// Decode the record addressed by `key` in `collection`
    pub fn load_record<K: RecordKey + ?Sized>(&self, collection: &str, key: &K) -> Result<Record> {
        let path = self.resolver.record_path(collection, key)?;
        self.load(&path).map_err(|e| match e {
            FsdbError::NotFound { .. } => FsdbError::NotFound {
                collection: collection.to_string(),
                id: key.record_id().unwrap_or_default().into_owned(),
            },
            other => other,
        })
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persist `record`, assigning a generated id if it has none
    ///
    /// `write` followed by `sync_collection`.
    pub fn save(&self, collection: &str, record: Record) -> Result<Record> {
        let record = self.write(collection, record)?;
        self.sync_collection(collection)?;
        Ok(record)
    }

    /// Atomically replace the backing file of `record`
    ///
    /// Steps:
    /// 1. Assign id (if absent)
    /// 2. Refuse to overwrite a record stored under a different raw id
    /// 3. Encode
    /// 4. Write + fsync temp file next to the target
    /// 5. Rename over the target
    ///
    /// The rename is not durable until `sync_collection` runs.
    pub fn write(&self, collection: &str, mut record: Record) -> Result<Record> {
        // Step 1: Assign an id if the record has none
        if record.needs_id()? {
            record.set_id(self.id_generator.generate());
        }

        let path = self.resolver.record_path(collection, &record)?;
        let temp_path = PathResolver::temp_path(&path);

        // Step 2: "a-b" and "ab" share one file; only one of them may own it
        let id = record.require_id()?.into_owned();
        if let Some(existing) = self.stored_id(&path)? {
            if existing != id {
                return Err(FsdbError::IdCollision {
                    collection: collection.to_string(),
                    id,
                    existing,
                });
            }
        }

        // Step 3: Encode before touching the filesystem
        let data = self.codec.encode(&record)?;

        // Step 4: Write temp file
        if let Err(e) = self.write_file(&temp_path, &data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        // Step 5: Atomic replace
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(record)
    }

    /// Make completed renames in `collection` durable (no-op unless
    /// `sync_writes` is set)
    pub fn sync_collection(&self, collection: &str) -> Result<()> {
        if self.sync_writes {
            sync_directory(&self.resolver.collection_path(collection))?;
        }
        Ok(())
    }

    /// Remove the backing file of the record addressed by `key`
    ///
    /// A missing file is `Ok(DeleteOutcome::Absent)`; any other I/O
    /// failure propagates.
    pub fn delete<K: RecordKey + ?Sized>(&self, collection: &str, key: &K) -> Result<DeleteOutcome> {
        let path = self.resolver.record_path(collection, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(DeleteOutcome::Removed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DeleteOutcome::Absent),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Number of record files in `collection`
    pub fn count(&self, collection: &str) -> Result<usize> {
        let mut count = 0;
        for id in self.ids(collection)? {
            id?;
            count += 1;
        }
        Ok(count)
    }

    /// Lazily decode every record in `collection`
    pub fn records(&self, collection: &str) -> Result<RecordIter> {
        let entries = fs::read_dir(self.resolver.collection_path(collection))?;
        Ok(RecordIter::new(
            entries,
            self.resolver.clone(),
            Arc::clone(&self.codec),
        ))
    }

    /// Lazily list the (normalized) identifiers in `collection`
    pub fn ids(&self, collection: &str) -> Result<IdIter> {
        let entries = fs::read_dir(self.resolver.collection_path(collection))?;
        Ok(IdIter::new(entries, self.resolver.clone()))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Raw id of the record currently stored at `path`
    ///
    /// A missing file, an undecodable file or a record without id leaves
    /// the slot free to overwrite.
    fn stored_id(&self, path: &Path) -> Result<Option<String>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(self
            .codec
            .decode(&bytes)
            .ok()
            .and_then(|stored| stored.id().map(Cow::into_owned)))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(data)?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// NotFound error for a record file, naming its collection and file stem
fn not_found_at(path: &Path) -> FsdbError {
    let name = |p: Option<&std::ffi::OsStr>| {
        p.map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    FsdbError::NotFound {
        collection: name(path.parent().and_then(Path::file_name)),
        id: name(path.file_stem()),
    }
}

/// Make a rename inside `dir` durable
#[cfg(unix)]
fn sync_directory(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> io::Result<()> {
    // NTFS journals metadata; directories cannot be opened for fsync
    Ok(())
}
