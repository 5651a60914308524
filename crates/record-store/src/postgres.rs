use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CollectionRegistry, Filter, Record, RecordId, RecordStoreError, Result, store::RecordStore,
};

/// PostgreSQL-backed record store implementation.
///
/// All collections share one `documents` table; each registered unique
/// field gets a partial unique index over `data->>'field'`.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
    registry: Arc<CollectionRegistry>,
}

impl PostgresRecordStore {
    /// Creates a new PostgreSQL record store.
    pub fn new(pool: PgPool, registry: Arc<CollectionRegistry>) -> Self {
        Self { pool, registry }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    /// Creates the unique indexes declared by the registry.
    ///
    /// Safe to call on every startup.
    pub async fn ensure_indexes(&self) -> Result<()> {
        for schema in self.registry.schemas() {
            for field in &schema.unique_fields {
                let sql = format!(
                    r#"CREATE UNIQUE INDEX IF NOT EXISTS "{index}" ON documents ((data->>'{field}')) WHERE collection = '{collection}'"#,
                    index = index_name(schema.name, field),
                    collection = schema.name,
                );
                sqlx::query(&sql).execute(&self.pool).await?;
                tracing::debug!(collection = schema.name, field, "ensured unique index");
            }
        }
        Ok(())
    }

    fn row_to_record(row: PgRow) -> Result<Record> {
        Ok(Record {
            id: RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            collection: row.try_get("collection")?,
            data: row.try_get("data")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Maps unique violations on our indexes to `DuplicateKey`.
    fn map_write_error(&self, collection: &str, err: sqlx::Error) -> RecordStoreError {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.code().as_deref() == Some("23505")
        {
            let field = db_err
                .constraint()
                .and_then(|constraint| {
                    self.registry
                        .schema(collection)
                        .ok()?
                        .unique_fields
                        .iter()
                        .find(|field| index_name(collection, field) == constraint)
                        .map(|field| (*field).to_string())
                })
                .unwrap_or_else(|| "id".to_string());
            return RecordStoreError::DuplicateKey {
                collection: collection.to_string(),
                field,
            };
        }
        RecordStoreError::Database(err)
    }

    async fn insert(&self, record: Record) -> Result<Record> {
        self.registry.schema(&record.collection)?;
        record.ensure_object()?;

        let row = sqlx::query(
            r#"
            INSERT INTO documents (id, collection, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.collection)
        .bind(&record.data)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| self.map_write_error(&record.collection, e))?;

        Self::row_to_record(row)
    }
}

fn index_name(collection: &str, field: &str) -> String {
    format!("documents_{collection}_{field}_key")
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Record>> {
        self.registry.schema(collection)?;

        let row = sqlx::query(
            r#"
            SELECT id, collection, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND data @> $2
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(collection)
        .bind(filter.as_object())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>> {
        self.registry.schema(collection)?;

        let rows = sqlx::query(
            r#"
            SELECT id, collection, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND data @> $2
            ORDER BY created_at ASC, id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(collection)
        .bind(filter.as_object())
        .bind(filter.limit.map(|l| l as i64))
        .bind(filter.offset.unwrap_or(0) as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Record>> {
        self.registry.schema(collection)?;

        let row = sqlx::query(
            r#"
            SELECT id, collection, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn create(&self, collection: &str, data: Value) -> Result<Record> {
        self.insert(Record::new(collection, data)).await
    }

    async fn create_with_id(&self, collection: &str, id: RecordId, data: Value) -> Result<Record> {
        self.insert(Record::with_id(id, collection, data)).await
    }

    async fn save(&self, mut record: Record) -> Result<Record> {
        self.registry.schema(&record.collection)?;
        record.ensure_object()?;
        record.updated_at = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO documents (id, collection, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = EXCLUDED.updated_at
            WHERE documents.collection = EXCLUDED.collection
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.collection)
        .bind(&record.data)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_write_error(&record.collection, e))?;

        // No row means the id is held by a record in another collection.
        let row = row.ok_or_else(|| RecordStoreError::DuplicateKey {
            collection: record.collection.clone(),
            field: "id".to_string(),
        })?;

        Self::row_to_record(row)
    }

    async fn find_by_id_and_update(
        &self,
        collection: &str,
        id: RecordId,
        patch: Value,
    ) -> Result<Option<Record>> {
        self.registry.schema(collection)?;
        if !patch.is_object() {
            return Err(RecordStoreError::InvalidDocument {
                collection: collection.to_string(),
                reason: "patch must be a JSON object".to_string(),
            });
        }

        let row = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .bind(&patch)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_write_error(collection, e))?;

        row.map(Self::row_to_record).transpose()
    }

    async fn find_by_id_and_delete(
        &self,
        collection: &str,
        id: RecordId,
    ) -> Result<Option<Record>> {
        self.registry.schema(collection)?;

        let row = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            RETURNING id, collection, data, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        self.registry.schema(collection)?;

        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND data @> $2")
            .bind(collection)
            .bind(filter.as_object())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
