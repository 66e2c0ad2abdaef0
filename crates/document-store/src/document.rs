use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::DocumentId;

/// Version number of a stored document, used for optimistic concurrency control.
///
/// A document is written at version 1 and every successful replace
/// increments the version by 1. Version 0 means "never stored".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) of a document that was never stored.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version (1) a document gets when first inserted.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A JSON document together with its storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Key of the document within its collection.
    pub id: DocumentId,

    /// Name of the collection the document lives in (e.g. "deliveries").
    pub collection: String,

    /// Version the document had when it was read.
    ///
    /// A replace succeeds only while the stored version still equals this value.
    pub version: Version,

    /// When the document was first inserted.
    pub created_at: DateTime<Utc>,

    /// When the document was last written.
    pub updated_at: DateTime<Utc>,

    /// The document body.
    pub body: serde_json::Value,
}

impl Document {
    /// Creates a document that has not been stored yet.
    pub fn new(collection: impl Into<String>, id: DocumentId, body: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            collection: collection.into(),
            version: Version::initial(),
            created_at: now,
            updated_at: now,
            body,
        }
    }

    /// Creates an unstored document from a serializable value.
    pub fn from_value<T: Serialize>(
        collection: impl Into<String>,
        id: DocumentId,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(collection, id, serde_json::to_value(value)?))
    }

    /// Replaces the body, keeping the key and the version that was read.
    pub fn with_body<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = serde_json::to_value(value)?;
        Ok(self)
    }

    /// Deserializes the body into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }

    /// Returns true if every field of `filter` is present in the body with an equal value.
    pub fn matches(&self, filter: &serde_json::Map<String, serde_json::Value>) -> bool {
        filter
            .iter()
            .all(|(field, expected)| self.body.get(field) == Some(expected))
    }
}
