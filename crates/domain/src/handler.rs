//! Load, mutate and persist cycle for a single document.

use std::marker::PhantomData;

use record_store::{
    Document, Filter, RecordId, RecordStore, RecordStoreError, RecordStoreExt, Stored,
};

use crate::error::DomainError;

/// Result of a mutation applied to a stored document.
#[derive(Debug)]
pub struct MutationResult<D, T> {
    /// The document as persisted after the mutation.
    pub document: Stored<D>,

    /// Whatever the mutation closure returned.
    pub output: T,
}

/// Handler for documents of one type.
///
/// The handler is responsible for:
/// 1. Loading the document from the record store (or creating it lazily)
/// 2. Running a mutation against the in-memory copy
/// 3. Writing the whole document back
///
/// There is no version check on write: two concurrent mutations of the same
/// document race and the last write wins.
pub struct DocumentHandler<S, D>
where
    S: RecordStore,
    D: Document,
{
    store: S,
    _phantom: PhantomData<D>,
}

impl<S, D> DocumentHandler<S, D>
where
    S: RecordStore,
    D: Document + 'static,
{
    /// Creates a new handler with the given record store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a document by id.
    pub async fn load_by_id(&self, id: RecordId) -> Result<Option<Stored<D>>, DomainError> {
        Ok(self.store.find_by_id_as::<D>(id).await?)
    }

    /// Loads the first document matching a filter.
    pub async fn load_one(&self, filter: &Filter) -> Result<Option<Stored<D>>, DomainError> {
        Ok(self.store.find_one_as::<D>(filter).await?)
    }

    /// Loads the document matching `filter`, creating it from `init` if absent.
    ///
    /// If another request creates the document between the lookup and the
    /// insert, the unique index rejects ours and the winner is re-read.
    pub async fn load_or_create<F>(&self, filter: &Filter, init: F) -> Result<Stored<D>, DomainError>
    where
        F: FnOnce() -> D,
    {
        if let Some(existing) = self.load_one(filter).await? {
            return Ok(existing);
        }

        match self.store.create_as(&init()).await {
            Ok(created) => Ok(created),
            Err(err @ RecordStoreError::DuplicateKey { .. }) => {
                tracing::debug!(collection = D::COLLECTION, "lost create race, re-reading");
                self.load_one(filter).await?.ok_or(DomainError::Store(err))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the document back to the store.
    pub async fn persist(&self, stored: &Stored<D>) -> Result<Stored<D>, DomainError> {
        Ok(self.store.save_as(stored).await?)
    }

    /// Applies `mutate` to the document and persists the result.
    ///
    /// Nothing is written if the closure returns an error.
    pub async fn execute<F, T, E>(
        &self,
        mut stored: Stored<D>,
        mutate: F,
    ) -> Result<MutationResult<D, T>, DomainError>
    where
        F: FnOnce(&mut D) -> Result<T, E>,
        DomainError: From<E>,
    {
        let output = mutate(&mut stored.doc)?;
        let document = self.persist(&stored).await?;
        Ok(MutationResult { document, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cart::CartError;

    use record_store::{CollectionRegistry, InMemoryRecordStore, Record};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Counter {
        owner_id: String,
        value: i32,
    }

    impl Document for Counter {
        const COLLECTION: &'static str = "counters";

        fn unique_fields() -> &'static [&'static str] {
            &["ownerId"]
        }
    }

    fn create_handler() -> (InMemoryRecordStore, DocumentHandler<InMemoryRecordStore, Counter>) {
        let registry = Arc::new(CollectionRegistry::new().with::<Counter>());
        let store = InMemoryRecordStore::new(registry);
        (store.clone(), DocumentHandler::new(store))
    }

    fn owner(id: &str) -> Filter {
        Filter::by("ownerId", id)
    }

    fn counter(id: &str) -> Counter {
        Counter {
            owner_id: id.to_string(),
            value: 0,
        }
    }

    #[tokio::test]
    async fn load_or_create_creates_once() {
        let (store, handler) = create_handler();

        let first = handler
            .load_or_create(&owner("a"), || counter("a"))
            .await
            .unwrap();
        let second = handler
            .load_or_create(&owner("a"), || counter("a"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.record_count().await, 1);
    }

    /// Store that lets a rival writer insert right after the first lookup.
    struct RivalAfterLookup {
        inner: InMemoryRecordStore,
        rival: std::sync::Mutex<Option<serde_json::Value>>,
    }

    #[async_trait::async_trait]
    impl RecordStore for RivalAfterLookup {
        async fn find_one(
            &self,
            collection: &str,
            filter: &Filter,
        ) -> record_store::Result<Option<Record>> {
            let rival = self.rival.lock().unwrap().take();
            match rival {
                Some(data) => {
                    self.inner.create(collection, data).await?;
                    Ok(None)
                }
                None => self.inner.find_one(collection, filter).await,
            }
        }

        async fn find(&self, collection: &str, filter: &Filter) -> record_store::Result<Vec<Record>> {
            self.inner.find(collection, filter).await
        }

        async fn find_by_id(
            &self,
            collection: &str,
            id: RecordId,
        ) -> record_store::Result<Option<Record>> {
            self.inner.find_by_id(collection, id).await
        }

        async fn create(
            &self,
            collection: &str,
            data: serde_json::Value,
        ) -> record_store::Result<Record> {
            self.inner.create(collection, data).await
        }

        async fn create_with_id(
            &self,
            collection: &str,
            id: RecordId,
            data: serde_json::Value,
        ) -> record_store::Result<Record> {
            self.inner.create_with_id(collection, id, data).await
        }

        async fn save(&self, record: Record) -> record_store::Result<Record> {
            self.inner.save(record).await
        }

        async fn find_by_id_and_update(
            &self,
            collection: &str,
            id: RecordId,
            patch: serde_json::Value,
        ) -> record_store::Result<Option<Record>> {
            self.inner.find_by_id_and_update(collection, id, patch).await
        }

        async fn find_by_id_and_delete(
            &self,
            collection: &str,
            id: RecordId,
        ) -> record_store::Result<Option<Record>> {
            self.inner.find_by_id_and_delete(collection, id).await
        }

        async fn delete_many(&self, collection: &str, filter: &Filter) -> record_store::Result<u64> {
            self.inner.delete_many(collection, filter).await
        }
    }

    #[tokio::test]
    async fn load_or_create_rereads_after_losing_create_race() {
        let (store, _) = create_handler();
        let mut rival = counter("a");
        rival.value = 9;
        let racing = RivalAfterLookup {
            inner: store.clone(),
            rival: std::sync::Mutex::new(Some(serde_json::to_value(&rival).unwrap())),
        };
        let handler = DocumentHandler::<_, Counter>::new(racing);

        let loaded = handler
            .load_or_create(&owner("a"), || counter("a"))
            .await
            .unwrap();

        assert_eq!(loaded.doc, rival);
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn load_or_create_surfaces_conflict_outside_filter() {
        let (store, handler) = create_handler();
        handler
            .load_or_create(&owner("a"), || counter("a"))
            .await
            .unwrap();

        let result = handler
            .load_or_create(&owner("b"), || counter("a"))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Store(RecordStoreError::DuplicateKey { .. }))
        ));
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn execute_persists_mutation() {
        let (_, handler) = create_handler();
        let stored = handler
            .load_or_create(&owner("a"), || counter("a"))
            .await
            .unwrap();

        let result = handler
            .execute(stored, |c| {
                c.value += 5;
                Ok::<_, CartError>(c.value)
            })
            .await
            .unwrap();

        assert_eq!(result.output, 5);
        let reloaded = handler.load_by_id(result.document.id).await.unwrap().unwrap();
        assert_eq!(reloaded.doc.value, 5);
    }

    #[tokio::test]
    async fn execute_does_not_persist_on_error() {
        let (_, handler) = create_handler();
        let stored = handler
            .load_or_create(&owner("a"), || counter("a"))
            .await
            .unwrap();
        let id = stored.id;

        let result = handler
            .execute(stored, |c| {
                c.value = -1;
                Err::<(), _>(CartError::InvalidQuantity { quantity: 0 })
            })
            .await;

        assert!(result.is_err());
        let reloaded = handler.load_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.doc.value, 0);
    }
}
