use std::collections::HashMap;

use crate::{Document, RecordStoreError, Result};

/// Schema of one registered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    /// Collection name.
    pub name: &'static str,

    /// Top-level fields that must not repeat across records.
    pub unique_fields: Vec<&'static str>,
}

impl CollectionSchema {
    /// Builds the schema for a document type.
    pub fn of<D: Document>() -> Self {
        Self {
            name: D::COLLECTION,
            unique_fields: D::unique_fields().to_vec(),
        }
    }
}

/// Registry of the collections a store may touch.
///
/// Built once at startup and handed to every store instance. Registration
/// is idempotent: registering a collection a second time keeps the schema
/// that was registered first.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    schemas: HashMap<&'static str, CollectionSchema>,
}

impl CollectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the collection of a document type.
    pub fn register<D: Document>(&mut self) -> &mut Self {
        self.register_schema(CollectionSchema::of::<D>())
    }

    /// Registers a schema directly.
    pub fn register_schema(&mut self, schema: CollectionSchema) -> &mut Self {
        if self.schemas.contains_key(schema.name) {
            tracing::debug!(collection = schema.name, "collection already registered");
        } else {
            self.schemas.insert(schema.name, schema);
        }
        self
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with<D: Document>(mut self) -> Self {
        self.register::<D>();
        self
    }

    /// Returns the schema of a collection, failing if it was never registered.
    pub fn schema(&self, collection: &str) -> Result<&CollectionSchema> {
        self.schemas
            .get(collection)
            .ok_or_else(|| RecordStoreError::UnknownCollection(collection.to_string()))
    }

    /// Returns true if the collection is registered.
    pub fn is_registered(&self, collection: &str) -> bool {
        self.schemas.contains_key(collection)
    }

    /// Iterates over every registered schema.
    pub fn schemas(&self) -> impl Iterator<Item = &CollectionSchema> {
        self.schemas.values()
    }

    /// Returns the number of registered collections.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
