use thiserror::Error;

use crate::{DocumentId, Version};

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// A document was saved against a version that is no longer current.
    #[error(
        "Concurrency conflict for {collection}/{id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        collection: String,
        id: DocumentId,
        expected: Version,
        actual: Version,
    },

    /// The document targeted by a replace or delete does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: DocumentId },

    /// A document with the same key already exists.
    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: DocumentId },

    /// The commit itself is malformed (empty, or touches a key twice).
    #[error("Invalid commit: {0}")]
    InvalidCommit(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocumentStoreError {
    /// Returns true if retrying against fresh state may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DocumentStoreError::ConcurrencyConflict { .. })
    }
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, DocumentStoreError>;
