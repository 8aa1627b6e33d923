//! Raw document store boundary.
//!
//! This is the external collaborator: a collection store with insert-one,
//! patch-by-id, delete-by-id and an ordered live query. It knows nothing about
//! notes; [`crate::NoteStoreClient`] maps documents to typed notes.

use crate::subscription::Subscription;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelf_core::{NoteId, StoreResult};
use std::cmp::Ordering;
use std::sync::Arc;

/// Document body: field name to JSON value.
pub type Fields = serde_json::Map<String, Value>;

/// A stored document with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: NoteId,
    #[serde(flatten)]
    pub fields: Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// Ordering clause of a live query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Order `documents` in place.
    ///
    /// Documents lacking the order field are dropped from the result, as an
    /// ordered query only matches documents that carry the field. The sort is
    /// stable, so ties keep insertion order.
    pub fn apply(&self, documents: &mut Vec<Document>) {
        documents.retain(|doc| doc.fields.contains_key(&self.field));
        documents.sort_by(|a, b| {
            let ordering = compare_values(a.fields.get(&self.field), b.fields.get(&self.field));
            match self.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }
}

/// Receives the full ordered result set of a live query.
pub type DocumentListener = Arc<dyn Fn(Vec<Document>) + Send + Sync>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document and return its new id.
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<NoteId>;

    /// Merge `fields` into an existing document. Fails if `id` is missing.
    async fn patch(&self, collection: &str, id: &NoteId, fields: Fields) -> StoreResult<()>;

    /// Delete a document by id.
    async fn remove(&self, collection: &str, id: &NoteId) -> StoreResult<()>;

    /// Open a live query over `collection`.
    async fn watch(
        &self,
        collection: &str,
        order: OrderBy,
        listener: DocumentListener,
    ) -> StoreResult<Subscription>;
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(a), Some(b)) => type_rank(a).cmp(&type_rank(b)),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, created_at: Option<&str>) -> Document {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), json!(id));
        if let Some(created_at) = created_at {
            fields.insert("createdAt".to_string(), json!(created_at));
        }
        Document {
            id: NoteId::new(id),
            fields,
        }
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_descending_order_newest_first() {
        let mut docs = vec![
            doc("a", Some("2024-01-01T00:00:00.000Z")),
            doc("b", Some("2024-03-01T00:00:00.000Z")),
            doc("c", Some("2024-02-01T00:00:00.000Z")),
        ];
        OrderBy::descending("createdAt").apply(&mut docs);
        assert_eq!(ids(&docs), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let at = "2024-01-01T00:00:00.000Z";
        let mut docs = vec![doc("first", Some(at)), doc("second", Some(at))];
        OrderBy::descending("createdAt").apply(&mut docs);
        assert_eq!(ids(&docs), vec!["first", "second"]);
    }

    #[test]
    fn test_documents_without_field_are_excluded() {
        let mut docs = vec![doc("a", None), doc("b", Some("2024-01-01T00:00:00.000Z"))];
        OrderBy::descending("createdAt").apply(&mut docs);
        assert_eq!(ids(&docs), vec!["b"]);
    }

    #[test]
    fn test_document_wire_form_is_flat() {
        let document = doc("x", Some("2024-01-01T00:00:00.000Z"));
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["id"], json!("x"));
        assert_eq!(value["title"], json!("x"));
        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back.id, NoteId::new("x"));
        assert!(!back.fields.contains_key("id"));
    }
}
