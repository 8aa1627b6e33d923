//! Note entity and its write payloads.
//!
//! Field names follow the document store's camelCase schema, so the same
//! types serialize straight into store documents.

use crate::identity::{iso8601, NoteId, Timestamp};
use serde::{Deserialize, Serialize};

/// Document field holding the creation instant. The live query orders on it.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Document field holding the last-write instant.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// A note as delivered by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Older documents may lack content entirely.
    #[serde(default)]
    pub content: String,
    pub category: String,
    pub authors: String,
    /// Year of creation. Never refreshed on update.
    pub date: String,
    /// Category background token captured at write time.
    pub color: String,
    /// Category accent token captured at write time.
    pub border_color: String,
    #[serde(with = "iso8601")]
    pub created_at: Timestamp,
    #[serde(with = "iso8601")]
    pub updated_at: Timestamp,
}

/// A note as supplied by the caller of `create`: everything except the id and
/// the timestamps, which the store client stamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub authors: String,
    pub date: String,
    pub color: String,
    pub border_color: String,
}

/// Partial update. `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self == &NotePatch::default()
    }
}
