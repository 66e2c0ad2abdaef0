use std::collections::HashSet;

use async_trait::async_trait;

use crate::{Document, DocumentId, DocumentQuery, DocumentStoreError, Result, Version};

/// A single write inside an atomic commit.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Stores a new document at version 1. Fails if the key is taken.
    Insert(Document),

    /// Overwrites a stored document.
    ///
    /// `document.version` must equal the stored version; the stored version
    /// is then incremented.
    Replace(Document),

    /// Removes a document, optionally checking its version first.
    Delete {
        collection: String,
        id: DocumentId,
        expected: Option<Version>,
    },
}

impl WriteOp {
    /// Creates a delete without a version check.
    pub fn delete(collection: impl Into<String>, id: DocumentId) -> Self {
        WriteOp::Delete {
            collection: collection.into(),
            id,
            expected: None,
        }
    }

    /// Returns the (collection, id) key this operation targets.
    pub fn target(&self) -> (&str, DocumentId) {
        match self {
            WriteOp::Insert(doc) | WriteOp::Replace(doc) => (doc.collection.as_str(), doc.id),
            WriteOp::Delete { collection, id, .. } => (collection.as_str(), *id),
        }
    }
}

/// Core trait for document store implementations.
///
/// A document store persists JSON documents keyed by (collection, id).
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Retrieves a single document by key.
    ///
    /// Returns None if no such document exists.
    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>>;

    /// Retrieves every document matching a query, in insertion order.
    async fn find(&self, query: DocumentQuery) -> Result<Vec<Document>>;

    /// Applies a batch of writes atomically - either all succeed or none do.
    ///
    /// Fails with `ConcurrencyConflict` if any replace or version-checked
    /// delete targets a document whose stored version differs from the
    /// expected one.
    async fn commit(&self, ops: Vec<WriteOp>) -> Result<()>;
}

/// Extension trait providing convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Inserts a single document, returning its new version.
    async fn insert(&self, document: Document) -> Result<Version> {
        self.commit(vec![WriteOp::Insert(document)]).await?;
        Ok(Version::first())
    }

    /// Replaces a single document, returning its new version.
    async fn replace(&self, document: Document) -> Result<Version> {
        let next = document.version.next();
        self.commit(vec![WriteOp::Replace(document)]).await?;
        Ok(next)
    }

    /// Deletes a single document without a version check.
    async fn delete(&self, collection: &str, id: DocumentId) -> Result<()> {
        self.commit(vec![WriteOp::delete(collection, id)]).await
    }

    /// Returns the first document matching a query.
    async fn find_one(&self, query: DocumentQuery) -> Result<Option<Document>> {
        Ok(self.find(query.limit(1)).await?.into_iter().next())
    }

    /// Checks whether a document exists.
    async fn exists(&self, collection: &str, id: DocumentId) -> Result<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Validates a batch of writes before it is applied.
///
/// A commit must be non-empty and may touch each key at most once.
pub fn validate_commit(ops: &[WriteOp]) -> Result<()> {
    if ops.is_empty() {
        return Err(DocumentStoreError::InvalidCommit(
            "Cannot commit an empty batch".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(ops.len());
    for op in ops {
        let (collection, id) = op.target();
        if !seen.insert((collection, id)) {
            return Err(DocumentStoreError::InvalidCommit(format!(
                "Document {collection}/{id} is written more than once"
            )));
        }
    }

    Ok(())
}
