//! Typed persistence on top of the document store.
//!
//! A [`Record`] is a serde model stored under a fixed collection. The
//! [`Repository`] loads records together with the version they were read at
//! ([`Versioned`]), and every write built from a `Versioned` is conditional on
//! that version. Multi-record changes go through [`Repository::commit`] so
//! they land atomically.

use std::future::Future;

use chrono::{DateTime, Utc};
use common::DocumentId;
use document_store::{Document, DocumentQuery, DocumentStore, DocumentStoreExt, Version, WriteOp};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use crate::error::DomainError;

/// How many times a lost optimistic race is retried before giving up.
pub const MAX_CONFLICT_RETRIES: usize = 3;

/// A model persisted as a JSON document.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the record lives in.
    const COLLECTION: &'static str;

    /// Document key of this record.
    fn key(&self) -> DocumentId;

    /// A query over the record's collection.
    fn query() -> DocumentQuery
    where
        Self: Sized,
    {
        DocumentQuery::new(Self::COLLECTION)
    }

    /// Builds the write that stores this record for the first time.
    fn insert_op(&self) -> Result<WriteOp, DomainError>
    where
        Self: Sized,
    {
        Ok(WriteOp::Insert(Document::from_value(
            Self::COLLECTION,
            self.key(),
            self,
        )?))
    }
}

/// A record together with the storage metadata it was read with.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<R> {
    pub record: R,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<R: Record> Versioned<R> {
    /// Wraps a record that was just inserted.
    pub fn inserted(record: R) -> Self {
        let now = Utc::now();
        Self {
            record,
            version: Version::first(),
            created_at: now,
            updated_at: now,
        }
    }

    fn from_document(document: &Document) -> Result<Self, DomainError> {
        Ok(Self {
            record: document.decode()?,
            version: document.version,
            created_at: document.created_at,
            updated_at: document.updated_at,
        })
    }

    /// Builds a write that overwrites the record, conditional on the read version.
    pub fn replace_op(&self) -> Result<WriteOp, DomainError> {
        let mut document = Document::from_value(R::COLLECTION, self.record.key(), &self.record)?;
        document.version = self.version;
        Ok(WriteOp::Replace(document))
    }

    /// Builds a write that removes the record, conditional on the read version.
    pub fn delete_op(&self) -> WriteOp {
        WriteOp::Delete {
            collection: R::COLLECTION.to_string(),
            id: self.record.key(),
            expected: Some(self.version),
        }
    }

    /// Returns the state this record has after a successful replace.
    pub fn committed(mut self) -> Self {
        self.version = self.version.next();
        self.updated_at = Utc::now();
        self
    }
}

/// Serializes as the record's fields plus `version`, `createdAt`, `updatedAt`.
impl<R: Serialize> Serialize for Versioned<R> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut value = serde_json::to_value(&self.record).map_err(serde::ser::Error::custom)?;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert("version".into(), self.version.as_i64().into());
            map.insert(
                "createdAt".into(),
                serde_json::to_value(self.created_at).map_err(serde::ser::Error::custom)?,
            );
            map.insert(
                "updatedAt".into(),
                serde_json::to_value(self.updated_at).map_err(serde::ser::Error::custom)?,
            );
        }
        value.serialize(serializer)
    }
}

/// Loads and commits typed records.
#[derive(Debug, Clone)]
pub struct Repository<S> {
    store: S,
}

impl<S: DocumentStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a record by key, returning None if it doesn't exist.
    pub async fn load<R: Record>(
        &self,
        id: impl Into<DocumentId> + Send,
    ) -> Result<Option<Versioned<R>>, DomainError> {
        let document = self.store.get(R::COLLECTION, id.into()).await?;
        document.as_ref().map(Versioned::from_document).transpose()
    }

    /// Loads every record matching a query.
    pub async fn find<R: Record>(
        &self,
        query: DocumentQuery,
    ) -> Result<Vec<Versioned<R>>, DomainError> {
        self.store
            .find(query)
            .await?
            .iter()
            .map(Versioned::from_document)
            .collect()
    }

    /// Loads the first record matching a query.
    pub async fn find_one<R: Record>(
        &self,
        query: DocumentQuery,
    ) -> Result<Option<Versioned<R>>, DomainError> {
        let document = self.store.find_one(query).await?;
        document.as_ref().map(Versioned::from_document).transpose()
    }

    /// Applies a batch of writes atomically.
    pub async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), DomainError> {
        self.store.commit(ops).await?;
        Ok(())
    }
}

/// Runs a read-check-write sequence, re-running it against fresh state when
/// the commit loses an optimistic race.
///
/// After [`MAX_CONFLICT_RETRIES`] retries the conflict is returned.
pub async fn retry_on_conflict<T, F, Fut>(operation: &'static str, mut attempt: F) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut retries = 0;
    loop {
        match attempt().await {
            Err(err) if err.is_conflict() && retries < MAX_CONFLICT_RETRIES => {
                retries += 1;
                metrics::counter!("store_conflict_retries_total", "operation" => operation)
                    .increment(1);
                tracing::warn!(operation, retries, error = %err, "lost optimistic race, retrying");
            }
            result => return result,
        }
    }
}
