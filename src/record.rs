//! Record type
//!
//! A record is a schema-free mapping from field name to JSON-like value.
//! Exactly one field, `id`, is reserved and identifies the record within
//! its collection.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FsdbError, Result};

/// Name of the reserved identifier field
pub const ID_FIELD: &str = "id";

/// A single schema-free record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field value, returning the previous one
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove a field
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// The record's identifier in string form.
    ///
    /// Strings are returned as-is and numbers are rendered in decimal.
    /// `None` when the field is absent, null, or of any other type.
    pub fn id(&self) -> Option<Cow<'_, str>> {
        match self.fields.get(ID_FIELD)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            _ => None,
        }
    }

    /// Whether the record still needs an identifier assigned
    pub(crate) fn needs_id(&self) -> Result<bool> {
        match self.fields.get(ID_FIELD) {
            None | Some(Value::Null) => Ok(true),
            Some(Value::String(s)) if s.is_empty() => Ok(true),
            Some(Value::String(_)) | Some(Value::Number(_)) => Ok(false),
            Some(other) => Err(FsdbError::InvalidId(format!(
                "expected string or number, found {}",
                other
            ))),
        }
    }

    /// Set the identifier field
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.fields.insert(ID_FIELD.to_string(), Value::String(id.into()));
    }

    /// Borrow the underlying field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume into the underlying field map
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Number of fields, including `id`
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Record {
    type Error = FsdbError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(FsdbError::Decode(format!(
                "expected a mapping at the top level, found {}",
                other
            ))),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.fields)
    }
}

// =============================================================================
// Record Keys
// =============================================================================

/// Anything that can address a record: a raw identifier or the record itself
pub trait RecordKey {
    /// Identifier of the addressed record, if one can be derived
    fn record_id(&self) -> Option<Cow<'_, str>>;

    /// Identifier or `InvalidId`
    fn require_id(&self) -> Result<Cow<'_, str>> {
        self.record_id()
            .ok_or_else(|| FsdbError::InvalidId("record has no id".to_string()))
    }
}

impl RecordKey for str {
    fn record_id(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl RecordKey for String {
    fn record_id(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl RecordKey for Record {
    fn record_id(&self) -> Option<Cow<'_, str>> {
        self.id()
    }
}

impl<T: RecordKey + ?Sized> RecordKey for &T {
    fn record_id(&self) -> Option<Cow<'_, str>> {
        (**self).record_id()
    }
}
