//! Record assembly
//!
//! Merges redacted text fields with the untouched metadata of a submission
//! into the record handed to a [`RecordStore`](crate::adapters::database::RecordStore).

use crate::domain::{RecordId, RedactedField, RedactorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A feedback record ready to be stored
///
/// Only redacted text reaches this type; raw field text never does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Store key
    pub id: RecordId,
    /// Submission schema version the record was built from
    pub schema_version: u32,
    /// When the submission was received
    pub received_at: DateTime<Utc>,
    /// Redacted text fields by name
    pub fields: BTreeMap<String, String>,
    /// Metadata copied unchanged from the submission
    pub passthrough: Map<String, Value>,
}

impl FeedbackRecord {
    /// Flat JSON document: passthrough and redacted fields side by side
    pub fn to_document(&self) -> Value {
        let mut doc = self.passthrough.clone();
        for (name, text) in &self.fields {
            doc.insert(name.clone(), Value::String(text.clone()));
        }
        doc.insert(
            "schema_version".to_string(),
            Value::from(self.schema_version),
        );
        Value::Object(doc)
    }

    /// Number of redacted text fields
    pub fn redacted_field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Build a record from redacted fields and passthrough metadata
///
/// # Errors
///
/// Returns [`RedactorError::Validation`] if two redacted fields share a name
/// or a redacted field name also appears in the passthrough map.
pub fn assemble(
    id: RecordId,
    received_at: DateTime<Utc>,
    schema_version: u32,
    fields: Vec<RedactedField>,
    passthrough: Map<String, Value>,
) -> Result<FeedbackRecord> {
    let mut by_name = BTreeMap::new();
    for field in fields {
        if passthrough.contains_key(&field.name) {
            return Err(RedactorError::Validation(format!(
                "Field '{}' is both redacted text and passthrough metadata",
                field.name
            )));
        }
        if by_name.insert(field.name.clone(), field.text).is_some() {
            return Err(RedactorError::Validation(format!(
                "Field '{}' was redacted twice",
                field.name
            )));
        }
    }

    Ok(FeedbackRecord {
        id,
        schema_version,
        received_at,
        fields: by_name,
        passthrough,
    })
}
