//! # fsdb
//!
//! A minimal embedded document store:
//! - One file per record, one directory per collection
//! - Atomic replace on every save (temp file + rename)
//! - Bounded LRU cache per collection, read-through on miss
//! - Secondary indexes with optional uniqueness and case-insensitivity
//! - Pluggable record codec and id generator
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Registry ──open──► Store                     │
//! │              (one lock per collection)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ RecordCache │          │  Secondary  │
//!   │    (LRU)    │          │   Indexes   │
//!   └──────┬──────┘          └─────────────┘
//!          │ miss
//!          ▼
//!   ┌─────────────┐   ┌─────────────┐
//!   │ RecordStore │──►│    Codec    │
//!   │ (file/rec.) │   └─────────────┘
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use fsdb::{CollectionOptions, Config, IndexDefinition, Record, Registry};
//!
//! # fn main() -> fsdb::Result<()> {
//! let mut registry = Registry::new();
//! registry.register_collection("users", CollectionOptions::default())?;
//! let store = registry.open(Config::builder().base_path("data").build())?;
//!
//! store.add_index(
//!     "users",
//!     IndexDefinition::new("by_name", ["name"]).unique().case_insensitive(),
//! )?;
//!
//! let brian = store.save("users", Record::new().with("name", "brian"))?;
//! let found = store.get("users", &brian)?;
//! assert_eq!(found.get("name"), brian.get("name"));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod id;
pub mod codec;
pub mod path;
pub mod storage;
pub mod cache;
pub mod index;
mod collection;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FsdbError, Result};
pub use config::{CollectionOptions, Config, EvictionPolicy};
pub use record::{Record, RecordKey};
pub use codec::{Codec, FnCodec, JsonCodec};
pub use id::{IdGenerator, UuidGenerator};
pub use path::normalize_text;
pub use index::IndexDefinition;
pub use storage::DeleteOutcome;
pub use engine::{Registry, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fsdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
