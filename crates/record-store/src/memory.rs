use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    CollectionRegistry, Filter, Record, RecordId, RecordStoreError, Result, store::RecordStore,
};

/// In-memory record store implementation.
///
/// Keeps every record in a single vector in creation order and enforces the
/// registry's unique fields the same way the PostgreSQL indexes do.
#[derive(Clone)]
pub struct InMemoryRecordStore {
    registry: Arc<CollectionRegistry>,
    records: Arc<RwLock<Vec<Record>>>,
}

impl InMemoryRecordStore {
    /// Creates a new empty in-memory store for the registered collections.
    pub fn new(registry: Arc<CollectionRegistry>) -> Self {
        Self {
            registry,
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Returns the registry this store was built with.
    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Returns the total number of records stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Fails if `candidate` repeats a unique field value held by another record.
    fn check_unique(&self, records: &[Record], candidate: &Record) -> Result<()> {
        let schema = self.registry.schema(&candidate.collection)?;
        for field in &schema.unique_fields {
            let Some(value) = candidate.field(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = records.iter().any(|r| {
                r.collection == candidate.collection
                    && r.id != candidate.id
                    && r.field(field) == Some(value)
            });
            if taken {
                return Err(RecordStoreError::DuplicateKey {
                    collection: candidate.collection.clone(),
                    field: (*field).to_string(),
                });
            }
        }
        Ok(())
    }

    async fn insert(&self, record: Record) -> Result<Record> {
        record.ensure_object()?;

        let mut records = self.records.write().await;
        // Ids are unique across collections.
        if records.iter().any(|r| r.id == record.id) {
            return Err(RecordStoreError::DuplicateKey {
                collection: record.collection,
                field: "id".to_string(),
            });
        }
        self.check_unique(&records, &record)?;
        records.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Record>> {
        self.registry.schema(collection)?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.collection == collection && filter.matches(&r.data))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>> {
        self.registry.schema(collection)?;
        let records = self.records.read().await;
        let matching = records
            .iter()
            .filter(|r| r.collection == collection && filter.matches(&r.data))
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Record>> {
        self.registry.schema(collection)?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.collection == collection && r.id == id)
            .cloned())
    }

    async fn create(&self, collection: &str, data: Value) -> Result<Record> {
        self.insert(Record::new(collection, data)).await
    }

    async fn create_with_id(&self, collection: &str, id: RecordId, data: Value) -> Result<Record> {
        self.insert(Record::with_id(id, collection, data)).await
    }

    async fn save(&self, mut record: Record) -> Result<Record> {
        record.ensure_object()?;
        record.updated_at = Utc::now();

        let mut records = self.records.write().await;
        self.check_unique(&records, &record)?;

        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) if existing.collection != record.collection => {
                Err(RecordStoreError::DuplicateKey {
                    collection: record.collection,
                    field: "id".to_string(),
                })
            }
            Some(existing) => {
                existing.data = record.data.clone();
                existing.updated_at = record.updated_at;
                Ok(existing.clone())
            }
            None => {
                records.push(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_id_and_update(
        &self,
        collection: &str,
        id: RecordId,
        patch: Value,
    ) -> Result<Option<Record>> {
        self.registry.schema(collection)?;

        let mut records = self.records.write().await;
        let Some(position) = records
            .iter()
            .position(|r| r.collection == collection && r.id == id)
        else {
            return Ok(None);
        };

        let mut updated = records[position].clone();
        updated.merge_patch(&patch)?;
        self.check_unique(&records, &updated)?;
        records[position] = updated.clone();
        Ok(Some(updated))
    }

    async fn find_by_id_and_delete(
        &self,
        collection: &str,
        id: RecordId,
    ) -> Result<Option<Record>> {
        self.registry.schema(collection)?;

        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|r| r.collection == collection && r.id == id);
        Ok(position.map(|p| records.remove(p)))
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        self.registry.schema(collection)?;

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.collection == collection && filter.matches(&r.data)));
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollectionSchema, RecordStoreExt};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Basket {
        owner_id: String,
        count: u32,
    }

    impl crate::Document for Basket {
        const COLLECTION: &'static str = "baskets";

        fn unique_fields() -> &'static [&'static str] {
            &["ownerId"]
        }
    }

    fn create_store() -> InMemoryRecordStore {
        let mut registry = CollectionRegistry::new();
        registry.register::<Basket>().register_schema(CollectionSchema {
            name: "notes",
            unique_fields: vec![],
        });
        InMemoryRecordStore::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn create_and_find_by_id() {
        let store = create_store();

        let record = store.create("notes", json!({"text": "hi"})).await.unwrap();
        let found = store.find_by_id("notes", record.id).await.unwrap();

        assert_eq!(found, Some(record));
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_collection_is_rejected() {
        let store = create_store();

        let result = store.create("ghosts", json!({})).await;
        assert!(matches!(result, Err(RecordStoreError::UnknownCollection(_))));
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let store = create_store();

        let result = store.create("notes", json!([1, 2, 3])).await;
        assert!(matches!(result, Err(RecordStoreError::InvalidDocument { .. })));
    }

    #[tokio::test]
    async fn unique_field_rejects_second_create() {
        let store = create_store();

        store
            .create("baskets", json!({"ownerId": "a", "count": 1}))
            .await
            .unwrap();
        let result = store
            .create("baskets", json!({"ownerId": "a", "count": 2}))
            .await;

        assert!(matches!(
            result,
            Err(RecordStoreError::DuplicateKey { ref field, .. }) if field == "ownerId"
        ));
    }

    #[tokio::test]
    async fn find_one_returns_first_match_in_creation_order() {
        let store = create_store();

        let first = store
            .create("notes", json!({"tag": "x", "n": 1}))
            .await
            .unwrap();
        store
            .create("notes", json!({"tag": "x", "n": 2}))
            .await
            .unwrap();

        let found = store
            .find_one("notes", &Filter::by("tag", "x"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn find_honors_limit_and_offset() {
        let store = create_store();
        for n in 0..5 {
            store.create("notes", json!({"n": n})).await.unwrap();
        }

        let page = store
            .find("notes", &Filter::new().offset(1).limit(2))
            .await
            .unwrap();
        let values: Vec<_> = page.iter().map(|r| r.data["n"].clone()).collect();
        assert_eq!(values, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn save_replaces_body_and_keeps_created_at() {
        let store = create_store();
        let mut record = store.create("notes", json!({"text": "a"})).await.unwrap();
        let created_at = record.created_at;

        record.data = json!({"text": "b"});
        let saved = store.save(record.clone()).await.unwrap();

        assert_eq!(saved.data, json!({"text": "b"}));
        assert_eq!(saved.created_at, created_at);
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn save_inserts_missing_record() {
        let store = create_store();
        let record = Record::new("notes", json!({"text": "fresh"}));

        store.save(record.clone()).await.unwrap();

        assert!(store.find_by_id("notes", record.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn save_does_not_cross_collections() {
        let store = create_store();
        let note = store.create("notes", json!({"text": "mine"})).await.unwrap();

        let intruder = Record::with_id(note.id, "baskets", json!({"ownerId": "x"}));
        let result = store.save(intruder).await;

        assert!(matches!(
            result,
            Err(RecordStoreError::DuplicateKey { ref field, .. }) if field == "id"
        ));
        let kept = store.find_by_id("notes", note.id).await.unwrap().unwrap();
        assert_eq!(kept.data, json!({"text": "mine"}));
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn find_by_id_and_update_merges_patch() {
        let store = create_store();
        let record = store
            .create("notes", json!({"text": "a", "pinned": false}))
            .await
            .unwrap();

        let updated = store
            .find_by_id_and_update("notes", record.id, json!({"pinned": true}))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.data, json!({"text": "a", "pinned": true}));

        let missing = store
            .find_by_id_and_update("notes", RecordId::new(), json!({"pinned": true}))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn find_by_id_and_delete_returns_removed_record() {
        let store = create_store();
        let record = store.create("notes", json!({"text": "a"})).await.unwrap();

        let removed = store
            .find_by_id_and_delete("notes", record.id)
            .await
            .unwrap();
        assert_eq!(removed.map(|r| r.id), Some(record.id));

        let again = store
            .find_by_id_and_delete("notes", record.id)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn delete_many_only_touches_matching_records() {
        let store = create_store();
        store.create("notes", json!({"tag": "x"})).await.unwrap();
        store.create("notes", json!({"tag": "x"})).await.unwrap();
        store.create("notes", json!({"tag": "y"})).await.unwrap();

        let deleted = store
            .delete_many("notes", &Filter::by("tag", "x"))
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn typed_round_trip_through_extension_trait() {
        let store = create_store();
        let basket = Basket {
            owner_id: "owner-1".to_string(),
            count: 3,
        };

        let mut stored = store.create_as(&basket).await.unwrap();
        stored.doc.count = 4;
        store.save_as(&stored).await.unwrap();

        let loaded = store
            .find_one_as::<Basket>(&Filter::by("ownerId", "owner-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, stored.id);
        assert_eq!(loaded.doc.count, 4);
    }
}
