//! Composite index keys

use std::fmt;

use serde_json::Value;

use crate::record::Record;

use super::IndexDefinition;

/// Canonical, comparable form of a record's indexed values
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(String);

impl CompositeKey {
    /// Derive the key `definition` assigns to `record`
    pub fn derive(definition: &IndexDefinition, record: &Record) -> Self {
        let mut values: Vec<Value> = definition
            .fields
            .iter()
            .map(|field| record.get(field).cloned().unwrap_or(Value::Null))
            .collect();

        if let Some(transform) = &definition.transform {
            values = transform(values);
        }

        let text = Value::Array(values).to_string();
        if definition.case_insensitive {
            Self(text.to_lowercase())
        } else {
            Self(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
