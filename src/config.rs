//! Configuration for fsdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::sync::Arc;

use crate::codec::{Codec, JsonCodec};
use crate::id::{IdGenerator, UuidGenerator};

/// Main configuration, applied when the registry is opened
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all collections
    /// Internal structure:
    ///   {base_path}/
    ///     └── {collection}/
    ///           └── {normalized_id}.{file_extension}
    pub base_path: PathBuf,

    /// Extension of record files, without the leading dot
    pub file_extension: String,

    /// fsync the temp file and the collection directory on every save
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    /// Record encode/decode pair
    pub codec: Arc<dyn Codec>,

    /// Source of identifiers for records saved without one
    pub id_generator: Arc<dyn IdGenerator>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data"),
            file_extension: "json".to_string(),
            sync_writes: true,
            codec: Arc::new(JsonCodec::default()),
            id_generator: Arc::new(UuidGenerator),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the base directory (root for all collections)
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.base_path = path.into();
        self
    }

    /// Set the record file extension
    pub fn file_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.file_extension = ext.into();
        self
    }

    /// Enable or disable fsync on save
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the record codec
    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.config.codec = Arc::new(codec);
        self
    }

    /// Set the identifier generator
    pub fn id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.config.id_generator = Arc::new(generator);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Collection Options
// =============================================================================

/// Eviction strategy of a collection's record cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Keep the `cache_capacity` most recently used records
    #[default]
    Lru,

    /// No caching, every get reads through to disk
    Disabled,
}

/// Per-collection options, fixed at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionOptions {
    /// Maximum number of cache-resident records
    pub cache_capacity: usize,

    /// Cache eviction strategy
    pub eviction: EvictionPolicy,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            cache_capacity: 1000,
            eviction: EvictionPolicy::Lru,
        }
    }
}

impl CollectionOptions {
    /// LRU cache holding at most `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache_capacity: capacity,
            ..Self::default()
        }
    }

    /// Set the eviction policy
    pub fn eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }
}
