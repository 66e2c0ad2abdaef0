use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Document, DocumentId, DocumentQuery, DocumentStoreError, Result, Version,
    store::{DocumentStore, WriteOp, validate_commit},
};

/// PostgreSQL-backed document store implementation.
///
/// Documents live in a single `documents` table with a JSONB body; a commit
/// runs in one transaction.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        Ok(Document {
            id: DocumentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            collection: row.try_get("collection")?,
            version: Version::new(row.try_get("version")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            body: row.try_get("body")?,
        })
    }

    /// Explains why a conditional write touched no row.
    async fn diagnose(
        tx: &mut Transaction<'_, Postgres>,
        collection: &str,
        id: DocumentId,
        expected: Version,
    ) -> DocumentStoreError {
        let actual: std::result::Result<Option<i64>, sqlx::Error> =
            sqlx::query_scalar("SELECT version FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id.as_uuid())
                .fetch_optional(&mut **tx)
                .await;

        match actual {
            Ok(Some(actual)) => DocumentStoreError::ConcurrencyConflict {
                collection: collection.to_string(),
                id,
                expected,
                actual: Version::new(actual),
            },
            Ok(None) => DocumentStoreError::NotFound {
                collection: collection.to_string(),
                id,
            },
            Err(e) => DocumentStoreError::Database(e),
        }
    }

    async fn apply(tx: &mut Transaction<'_, Postgres>, op: WriteOp) -> Result<()> {
        let now = Utc::now();
        match op {
            WriteOp::Insert(doc) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO documents (collection, id, version, created_at, updated_at, body)
                    VALUES ($1, $2, $3, $4, $4, $5)
                    ON CONFLICT (collection, id) DO NOTHING
                    "#,
                )
                .bind(&doc.collection)
                .bind(doc.id.as_uuid())
                .bind(Version::first().as_i64())
                .bind(now)
                .bind(&doc.body)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DocumentStoreError::AlreadyExists {
                        collection: doc.collection,
                        id: doc.id,
                    });
                }
            }
            WriteOp::Replace(doc) => {
                let result = sqlx::query(
                    r#"
                    UPDATE documents
                    SET version = version + 1, updated_at = $4, body = $5
                    WHERE collection = $1 AND id = $2 AND version = $3
                    "#,
                )
                .bind(&doc.collection)
                .bind(doc.id.as_uuid())
                .bind(doc.version.as_i64())
                .bind(now)
                .bind(&doc.body)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(Self::diagnose(tx, &doc.collection, doc.id, doc.version).await);
                }
            }
            WriteOp::Delete {
                collection,
                id,
                expected,
            } => {
                let result = sqlx::query(
                    r#"
                    DELETE FROM documents
                    WHERE collection = $1 AND id = $2 AND ($3::BIGINT IS NULL OR version = $3)
                    "#,
                )
                .bind(&collection)
                .bind(id.as_uuid())
                .bind(expected.map(|v| v.as_i64()))
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    let expected = expected.unwrap_or_default();
                    return Err(Self::diagnose(tx, &collection, id, expected).await);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query(
            r#"
            SELECT collection, id, version, created_at, updated_at, body
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn find(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        let mut sql = String::from(
            "SELECT collection, id, version, created_at, updated_at, body FROM documents WHERE collection = $1",
        );
        let mut param_count = 1;

        // Build dynamic query
        if !query.filter.is_empty() {
            param_count += 1;
            sql.push_str(&format!(" AND body @> ${param_count}"));
        }
        if query.any_of.is_some() {
            param_count += 2;
            sql.push_str(&format!(
                " AND ${}::jsonb @> (body -> ${})",
                param_count - 1,
                param_count
            ));
        }

        sql.push_str(" ORDER BY seq ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        // Build and execute query with parameters
        let mut sqlx_query = sqlx::query(&sql).bind(&query.collection);

        if !query.filter.is_empty() {
            sqlx_query = sqlx_query.bind(serde_json::Value::Object(query.filter.clone()));
        }
        if let Some((field, values)) = &query.any_of {
            sqlx_query = sqlx_query
                .bind(serde_json::Value::Array(values.clone()))
                .bind(field.clone());
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_document).collect()
    }

    #[tracing::instrument(skip(self, ops), fields(ops = ops.len()))]
    async fn commit(&self, ops: Vec<WriteOp>) -> Result<()> {
        validate_commit(&ops)?;

        // Start a transaction; dropping it on error rolls everything back
        let mut tx = self.pool.begin().await?;

        for op in ops {
            Self::apply(&mut tx, op).await?;
        }

        tx.commit().await?;
        metrics::counter!("document_store_commits_total").increment(1);
        Ok(())
    }
}
