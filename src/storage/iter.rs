//! Collection iterators
//!
//! Both iterators wrap a single `read_dir` pass: finite, in filesystem
//! enumeration order. Calling `records()`/`ids()` again re-scans.

use std::fs::ReadDir;
use std::sync::Arc;

use crate::codec::Codec;
use crate::error::{FsdbError, Result};
use crate::path::PathResolver;
use crate::record::Record;

/// Iterator over the decoded records of a collection
pub struct RecordIter {
    entries: ReadDir,
    resolver: PathResolver,
    codec: Arc<dyn Codec>,
}

impl RecordIter {
    pub(crate) fn new(entries: ReadDir, resolver: PathResolver, codec: Arc<dyn Codec>) -> Self {
        Self {
            entries,
            resolver,
            codec,
        }
    }
}

impl Iterator for RecordIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = match self.entries.next()? {
                Ok(entry) => entry.path(),
                Err(e) => return Some(Err(e.into())),
            };
            if !self.resolver.is_record_file(&path) {
                continue;
            }
            let decoded = std::fs::read(&path)
                .map_err(FsdbError::from)
                .and_then(|bytes| self.codec.decode(&bytes));
            return Some(decoded);
        }
    }
}

/// Iterator over the identifiers of a collection, without decoding
pub struct IdIter {
    entries: ReadDir,
    resolver: PathResolver,
}

impl IdIter {
    pub(crate) fn new(entries: ReadDir, resolver: PathResolver) -> Self {
        Self { entries, resolver }
    }
}

impl Iterator for IdIter {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = match self.entries.next()? {
                Ok(entry) => entry.path(),
                Err(e) => return Some(Err(e.into())),
            };
            if let Some(id) = self.resolver.id_from_path(&path) {
                return Some(Ok(id));
            }
        }
    }
}
