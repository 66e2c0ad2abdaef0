use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    Document, DocumentId, DocumentQuery, DocumentStoreError, Result, Version,
    store::{DocumentStore, WriteOp, validate_commit},
};

type Collections = HashMap<String, Vec<Document>>;

/// In-memory document store implementation.
///
/// Used by tests and by the server when no database is configured.
/// Provides the same interface and commit semantics as the PostgreSQL
/// implementation: a commit is checked in full under one write lock before
/// any of it is applied.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Removes every document.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
    }
}

fn stored<'a>(store: &'a Collections, collection: &str, id: DocumentId) -> Option<&'a Document> {
    store.get(collection)?.iter().find(|d| d.id == id)
}

fn check(store: &Collections, op: &WriteOp) -> Result<()> {
    match op {
        WriteOp::Insert(doc) => {
            if stored(store, &doc.collection, doc.id).is_some() {
                return Err(DocumentStoreError::AlreadyExists {
                    collection: doc.collection.clone(),
                    id: doc.id,
                });
            }
        }
        WriteOp::Replace(doc) => {
            let current = stored(store, &doc.collection, doc.id).ok_or_else(|| {
                DocumentStoreError::NotFound {
                    collection: doc.collection.clone(),
                    id: doc.id,
                }
            })?;
            if current.version != doc.version {
                return Err(DocumentStoreError::ConcurrencyConflict {
                    collection: doc.collection.clone(),
                    id: doc.id,
                    expected: doc.version,
                    actual: current.version,
                });
            }
        }
        WriteOp::Delete {
            collection,
            id,
            expected,
        } => {
            let current =
                stored(store, collection, *id).ok_or_else(|| DocumentStoreError::NotFound {
                    collection: collection.clone(),
                    id: *id,
                })?;
            if let Some(expected) = expected
                && current.version != *expected
            {
                return Err(DocumentStoreError::ConcurrencyConflict {
                    collection: collection.clone(),
                    id: *id,
                    expected: *expected,
                    actual: current.version,
                });
            }
        }
    }
    Ok(())
}

fn apply(store: &mut Collections, op: WriteOp) {
    let now = Utc::now();
    match op {
        WriteOp::Insert(mut doc) => {
            doc.version = Version::first();
            doc.created_at = now;
            doc.updated_at = now;
            store.entry(doc.collection.clone()).or_default().push(doc);
        }
        WriteOp::Replace(mut doc) => {
            if let Some(slot) = store
                .get_mut(&doc.collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == doc.id))
            {
                doc.version = slot.version.next();
                doc.created_at = slot.created_at;
                doc.updated_at = now;
                *slot = doc;
            }
        }
        WriteOp::Delete { collection, id, .. } => {
            if let Some(docs) = store.get_mut(&collection) {
                docs.retain(|d| d.id != id);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        let store = self.collections.read().await;
        Ok(stored(&store, collection, id).cloned())
    }

    async fn find(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        let store = self.collections.read().await;
        let Some(docs) = store.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(docs
            .iter()
            .filter(|d| query.matches(d))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn commit(&self, ops: Vec<WriteOp>) -> Result<()> {
        validate_commit(&ops)?;

        let mut store = self.collections.write().await;

        // Check everything against the pre-commit state before touching it
        for op in &ops {
            check(&store, op)?;
        }

        for op in ops {
            apply(&mut store, op);
        }

        Ok(())
    }
}
