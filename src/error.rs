//! Error types for fsdb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FsdbError
pub type Result<T> = std::result::Result<T, FsdbError>;

/// Unified error type for fsdb operations
#[derive(Debug, Error)]
pub enum FsdbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Invalid record id: {0}")]
    InvalidId(String),

    #[error("Record id '{id}' collides with stored id '{existing}' in collection '{collection}'")]
    IdCollision {
        collection: String,
        id: String,
        existing: String,
    },

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("Unique constraint violated on index '{index}' of collection '{collection}' for key {key}")]
    UniqueConstraint {
        collection: String,
        index: String,
        key: String,
    },

    #[error("Index '{index}' not found on collection '{collection}'")]
    IndexNotFound { collection: String, index: String },

    // -------------------------------------------------------------------------
    // Registry / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FsdbError {
    /// True for the "record does not exist" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsdbError::NotFound { .. })
    }
}
