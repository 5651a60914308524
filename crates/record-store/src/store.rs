use async_trait::async_trait;
use serde_json::Value;

use crate::{Document, Filter, Record, RecordId, Result, Stored};

/// Core trait for record store implementations.
///
/// A record store persists JSON documents grouped into collections. Every
/// operation names its collection, and the collection must be registered
/// with the store's [`CollectionRegistry`](crate::CollectionRegistry).
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the first record matching the filter, in creation order.
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Record>>;

    /// Returns every record matching the filter, in creation order.
    ///
    /// Honors the filter's `limit` and `offset`.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>>;

    /// Retrieves a record by id.
    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Record>>;

    /// Inserts a new record holding `data` and returns it.
    ///
    /// Fails with `DuplicateKey` if a unique field collides with an
    /// existing record.
    async fn create(&self, collection: &str, data: Value) -> Result<Record>;

    /// Inserts a record with a caller-chosen id.
    async fn create_with_id(&self, collection: &str, id: RecordId, data: Value) -> Result<Record>;

    /// Replaces the stored body of a record, inserting it if absent.
    ///
    /// Ids are unique across collections: saving over an id held by another
    /// collection fails with `DuplicateKey` on `id`.
    async fn save(&self, record: Record) -> Result<Record>;

    /// Shallow-merges `patch` into a record's body.
    ///
    /// Returns the updated record, or None if no record has that id.
    async fn find_by_id_and_update(
        &self,
        collection: &str,
        id: RecordId,
        patch: Value,
    ) -> Result<Option<Record>>;

    /// Deletes a record by id, returning it if it existed.
    async fn find_by_id_and_delete(&self, collection: &str, id: RecordId)
    -> Result<Option<Record>>;

    /// Deletes every record matching the filter and returns how many went.
    ///
    /// The filter's `limit` and `offset` are ignored.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64>;
}

/// Extension trait providing typed access for [`Document`] types.
#[async_trait]
pub trait RecordStoreExt: RecordStore {
    /// Finds the first document matching the filter.
    async fn find_one_as<D: Document>(&self, filter: &Filter) -> Result<Option<Stored<D>>> {
        self.find_one(D::COLLECTION, filter)
            .await?
            .map(Stored::from_record)
            .transpose()
    }

    /// Loads a document by id.
    async fn find_by_id_as<D: Document>(&self, id: RecordId) -> Result<Option<Stored<D>>> {
        self.find_by_id(D::COLLECTION, id)
            .await?
            .map(Stored::from_record)
            .transpose()
    }

    /// Inserts a new document.
    async fn create_as<D: Document>(&self, doc: &D) -> Result<Stored<D>> {
        let data = serde_json::to_value(doc)?;
        let record = self.create(D::COLLECTION, data).await?;
        Stored::from_record(record)
    }

    /// Inserts a new document under a caller-chosen id.
    async fn create_as_with_id<D: Document>(&self, id: RecordId, doc: &D) -> Result<Stored<D>> {
        let data = serde_json::to_value(doc)?;
        let record = self.create_with_id(D::COLLECTION, id, data).await?;
        Stored::from_record(record)
    }

    /// Writes a loaded document back.
    async fn save_as<D: Document>(&self, stored: &Stored<D>) -> Result<Stored<D>> {
        let record = self.save(stored.to_record()?).await?;
        Stored::from_record(record)
    }
}

// Blanket implementation for all RecordStore implementations
impl<T: RecordStore + ?Sized> RecordStoreExt for T {}
