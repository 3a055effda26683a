//! Path Resolver
//!
//! Maps `(collection, id)` pairs onto the on-disk layout:
//!
//! ```text
//! {base_path}/
//!   ├── users/
//!   │     ├── {normalized_id}.{ext}
//!   │     └── ...
//!   └── posts/
//!         └── ...
//! ```
//!
//! Identifiers are normalized before they touch the filesystem, which also
//! rules out path traversal: separators and `..` are punctuation and get
//! stripped.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{FsdbError, Result};
use crate::record::RecordKey;

/// Suffix appended to a record path while its new contents are being written
pub const TEMP_SUFFIX: &str = "tmp";

fn punctuation() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    // Literal pattern: it either always compiles or never does, and the unit
    // tests below compile it.
    PUNCTUATION.get_or_init(|| Regex::new(r"\p{P}+").expect("static regex is valid"))
}

/// Make `text` safe for use as a file name.
///
/// Trims, optionally lowercases, applies compatibility decomposition (NFKD),
/// strips Unicode punctuation and finally drops every non-ASCII char. Accents
/// therefore degrade to their base letter (`"Café"` → `"Cafe"`).
///
/// The result is trimmed again, so normalizing a normalized string is a
/// no-op.
pub fn normalize_text(text: &str, lowercase: bool) -> String {
    let trimmed = text.trim();
    let cased = if lowercase {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    };
    let decomposed: String = cased.nfkd().collect();
    let stripped: String = punctuation()
        .replace_all(&decomposed, "")
        .chars()
        .filter(char::is_ascii)
        .collect();
    stripped.trim().to_string()
}

/// Resolves collection directories and record files under a base path
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_path: PathBuf,
    extension: String,
}

impl PathResolver {
    pub fn new(base_path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            extension: extension.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Directory holding every record of `collection`
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.base_path.join(collection)
    }

    /// Canonical identifier of the record addressed by `key`: its normalized
    /// id, which is also the stem of its backing file.
    ///
    /// Ids that normalize alike address the same record. Caches and indexes
    /// are keyed by this value, never by the raw id.
    ///
    /// Fails with `InvalidId` when the key carries no identifier or the
    /// identifier normalizes to nothing.
    pub fn canonical_id<K: RecordKey + ?Sized>(key: &K) -> Result<String> {
        let id = key.require_id()?;
        let normalized = normalize_text(&id, false);
        if normalized.is_empty() {
            return Err(FsdbError::InvalidId(format!(
                "'{}' has no filesystem-safe characters",
                id
            )));
        }
        Ok(normalized)
    }

    /// Backing file of the record addressed by `key`.
    pub fn record_path<K: RecordKey + ?Sized>(&self, collection: &str, key: &K) -> Result<PathBuf> {
        let canonical = Self::canonical_id(key)?;
        Ok(self
            .collection_path(collection)
            .join(format!("{}.{}", canonical, self.extension)))
    }

    /// Scratch path a new version is written to before the atomic rename
    pub fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(TEMP_SUFFIX);
        path.with_file_name(name)
    }

    /// Whether `path` names a record file (right extension, not a temp file)
    ///
    /// Canonical ids never contain a dot, so a stem with one is a temp file
    /// (`abc.json.tmp`) or something foreign. This holds even when the
    /// record extension is itself `tmp`.
    pub fn is_record_file(&self, path: &Path) -> bool {
        let extension_matches = path
            .extension()
            .is_some_and(|ext| ext == OsStr::new(&self.extension));
        let plain_stem = path
            .file_stem()
            .is_some_and(|stem| !stem.to_string_lossy().contains('.'));
        extension_matches && plain_stem
    }

    /// Identifier component of a record file name
    /// "{dir}/abc.json" → Some("abc")
    pub fn id_from_path(&self, path: &Path) -> Option<String> {
        if !self.is_record_file(path) {
            return None;
        }
        Some(path.file_stem()?.to_string_lossy().into_owned())
    }
}
