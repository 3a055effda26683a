//! Index definitions

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{FsdbError, Result};

/// Rewrites the extracted field values before they become a key
pub type Transform = Arc<dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync>;

/// What to index and how
#[derive(Clone)]
pub struct IndexDefinition {
    /// Index name, unique within its collection
    pub name: String,

    /// Indexed fields, in key order
    pub fields: Vec<String>,

    /// Optional value transform
    pub transform: Option<Transform>,

    /// At most one record per composite key
    pub unique: bool,

    /// Compare keys case-insensitively
    pub case_insensitive: bool,
}

impl IndexDefinition {
    /// Non-unique, case-sensitive index on `fields`
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            transform: None,
            unique: false,
            case_insensitive: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Pass extracted values through `transform` before keying
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Reject empty names and empty field lists
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(FsdbError::Config("index name must not be empty".to_string()));
        }
        if self.fields.is_empty() {
            return Err(FsdbError::Config(format!(
                "index '{}' must have at least one field",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for IndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexDefinition")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("transform", &self.transform.is_some())
            .field("unique", &self.unique)
            .field("case_insensitive", &self.case_insensitive)
            .finish()
    }
}
