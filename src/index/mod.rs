//! Index Module
//!
//! Secondary indexes over a collection, for exact-match lookups.
//!
//! ## Responsibilities
//! - Derive a composite key from a record's indexed fields
//! - Map composite key → set of canonical record ids
//! - Enforce uniqueness (optionally case-insensitive)
//! - Stay synchronous with every save and delete (no background rebuild)
//!
//! ## Composite Key Derivation
//! ```text
//! record ──► [field_1, field_2, ...]     (missing field → null)
//!        ──► transform(values)           (optional)
//!        ──► JSON array text             (canonical, comparable)
//!        ──► lowercase                   (case-insensitive only)
//! ```
//!
//! ## Lifecycle
//! `empty → populated` when built by scanning the collection, then updated
//! incrementally forever after.

mod definition;
mod key;
mod secondary;

pub use definition::{IndexDefinition, Transform};
pub use key::CompositeKey;
pub use secondary::SecondaryIndex;
