use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Document, RecordId, RecordStoreError, Result};

/// A stored JSON document together with its storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier of the record.
    pub id: RecordId,

    /// Collection the record belongs to.
    pub collection: String,

    /// The document body. Always a JSON object.
    pub data: serde_json::Value,

    /// When the record was first created.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Creates a new record with a fresh id.
    pub fn new(collection: impl Into<String>, data: serde_json::Value) -> Self {
        Self::with_id(RecordId::new(), collection, data)
    }

    /// Creates a new record with a caller-chosen id.
    pub fn with_id(id: RecordId, collection: impl Into<String>, data: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            collection: collection.into(),
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the value of a top-level field, if present.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.data.get(name)
    }

    /// Fails unless the record body is a JSON object.
    pub fn ensure_object(&self) -> Result<()> {
        if self.data.is_object() {
            Ok(())
        } else {
            Err(RecordStoreError::InvalidDocument {
                collection: self.collection.clone(),
                reason: "document body must be a JSON object".to_string(),
            })
        }
    }

    /// Shallow-merges the top-level keys of `patch` into the body.
    pub fn merge_patch(&mut self, patch: &serde_json::Value) -> Result<()> {
        let Some(patch) = patch.as_object() else {
            return Err(RecordStoreError::InvalidDocument {
                collection: self.collection.clone(),
                reason: "patch must be a JSON object".to_string(),
            });
        };
        self.ensure_object()?;
        if let Some(body) = self.data.as_object_mut() {
            for (key, value) in patch {
                body.insert(key.clone(), value.clone());
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A typed document loaded from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<D> {
    /// Identifier of the underlying record.
    pub id: RecordId,

    /// When the record was first created.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,

    /// The decoded document.
    pub doc: D,
}

impl<D: Document> Stored<D> {
    /// Decodes a raw record into a typed document.
    pub fn from_record(record: Record) -> Result<Self> {
        Ok(Self {
            id: record.id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            doc: serde_json::from_value(record.data)?,
        })
    }

    /// Encodes the document back into a raw record.
    pub fn to_record(&self) -> Result<Record> {
        Ok(Record {
            id: self.id,
            collection: D::COLLECTION.to_string(),
            data: serde_json::to_value(&self.doc)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_patch_overwrites_top_level_keys_only() {
        let mut record = Record::new("carts", json!({"a": 1, "b": {"c": 2}}));
        record.merge_patch(&json!({"b": {"d": 3}, "e": true})).unwrap();

        assert_eq!(record.data, json!({"a": 1, "b": {"d": 3}, "e": true}));
    }

    #[test]
    fn merge_patch_rejects_non_object_patch() {
        let mut record = Record::new("carts", json!({"a": 1}));
        assert!(record.merge_patch(&json!([1, 2])).is_err());
    }

    #[test]
    fn ensure_object_rejects_scalars() {
        let record = Record::new("carts", json!("nope"));
        assert!(matches!(
            record.ensure_object(),
            Err(RecordStoreError::InvalidDocument { .. })
        ));
    }
}
