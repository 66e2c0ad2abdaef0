use serde_json::{Map, Value};

use crate::Document;

/// Builder for document lookups within one collection.
///
/// Filters compare top-level body fields for JSON equality. Results are
/// returned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    /// The collection to search.
    pub collection: String,

    /// Fields that must equal the given values.
    pub filter: Map<String, Value>,

    /// A field that must equal any one of the given values.
    pub any_of: Option<(String, Vec<Value>)>,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,

    /// Number of documents to skip.
    pub offset: Option<usize>,
}

impl DocumentQuery {
    /// Creates a query matching every document of a collection.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Requires a top-level field to equal a value.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    /// Requires a top-level field to equal one of several values.
    pub fn field_in<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.any_of = Some((field.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the document belongs to the collection and passes every filter.
    pub fn matches(&self, document: &Document) -> bool {
        if document.collection != self.collection || !document.matches(&self.filter) {
            return false;
        }
        if let Some((field, values)) = &self.any_of {
            return document
                .body
                .get(field)
                .is_some_and(|actual| values.contains(actual));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentId;

    fn doc(collection: &str, body: Value) -> Document {
        Document::new(collection, DocumentId::new(), body)
    }

    #[test]
    fn query_builder_sets_filters() {
        let query = DocumentQuery::new("pump_banks")
            .field_eq("stationId", "s1")
            .field_in("tankId", ["t1", "t2"])
            .limit(10)
            .offset(5);

        assert_eq!(query.collection, "pump_banks");
        assert_eq!(query.filter["stationId"], "s1");
        assert_eq!(query.any_of.as_ref().unwrap().1.len(), 2);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, Some(5));
    }

    #[test]
    fn matches_respects_collection() {
        let query = DocumentQuery::new("staff");
        assert!(query.matches(&doc("staff", serde_json::json!({}))));
        assert!(!query.matches(&doc("stations", serde_json::json!({}))));
    }

    #[test]
    fn matches_any_of_values() {
        let query = DocumentQuery::new("pump_banks").field_in("tankId", ["t1", "t2"]);
        assert!(query.matches(&doc("pump_banks", serde_json::json!({"tankId": "t2"}))));
        assert!(!query.matches(&doc("pump_banks", serde_json::json!({"tankId": "t3"}))));
        assert!(!query.matches(&doc("pump_banks", serde_json::json!({}))));
    }
}
