//! Note store client: typed notes over a raw document store.
//!
//! Stamps `createdAt`/`updatedAt` with the client's clock (the store never
//! sets them), maps documents to [`Note`] values, and logs every failed write
//! before handing the error back to the caller. Nothing is retried.

use crate::document::{Document, DocumentListener, DocumentStore, Fields, OrderBy};
use crate::subscription::Subscription;
use crate::{NoteStore, SnapshotListener, NOTES_COLLECTION};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shelf_core::identity::iso8601;
use shelf_core::{
    Clock, Note, NoteDraft, NoteId, NotePatch, StoreError, StoreResult, SystemClock,
    CREATED_AT_FIELD, UPDATED_AT_FIELD,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct NoteStoreClient<D> {
    documents: D,
    clock: Arc<dyn Clock>,
}

impl<D: DocumentStore> NoteStoreClient<D> {
    pub fn new(documents: D) -> Self {
        Self::with_clock(documents, Arc::new(SystemClock))
    }

    pub fn with_clock(documents: D, clock: Arc<dyn Clock>) -> Self {
        Self { documents, clock }
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }
}

#[async_trait]
impl<D: DocumentStore> NoteStore for NoteStoreClient<D> {
    async fn subscribe(&self, on_snapshot: SnapshotListener) -> StoreResult<Subscription> {
        let listener: DocumentListener = Arc::new(move |documents: Vec<Document>| {
            let notes = notes_from_documents(documents);
            debug!(count = notes.len(), "Note snapshot delivered");
            on_snapshot(notes);
        });
        let order = OrderBy::descending(CREATED_AT_FIELD);
        match self.documents.watch(NOTES_COLLECTION, order, listener).await {
            Ok(subscription) => {
                info!(collection = NOTES_COLLECTION, "Subscribed to notes");
                Ok(subscription)
            }
            Err(err) => {
                error!(error = %err, "Error subscribing to notes");
                Err(err)
            }
        }
    }

    async fn create(&self, draft: NoteDraft) -> StoreResult<NoteId> {
        let now = iso8601::format(&self.clock.now());
        let mut fields = to_fields(&draft)?;
        fields.insert(CREATED_AT_FIELD.to_string(), Value::String(now.clone()));
        fields.insert(UPDATED_AT_FIELD.to_string(), Value::String(now));

        match self.documents.insert(NOTES_COLLECTION, fields).await {
            Ok(id) => {
                info!(note_id = %id, "Note created");
                Ok(id)
            }
            Err(err) => {
                error!(error = %err, "Error adding note");
                Err(err)
            }
        }
    }

    async fn update(&self, id: &NoteId, patch: NotePatch) -> StoreResult<()> {
        let mut fields = to_fields(&patch)?;
        fields.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(iso8601::format(&self.clock.now())),
        );

        match self.documents.patch(NOTES_COLLECTION, id, fields).await {
            Ok(()) => {
                info!(note_id = %id, "Note updated");
                Ok(())
            }
            Err(err) => {
                error!(note_id = %id, error = %err, "Error updating note");
                Err(err)
            }
        }
    }

    async fn delete(&self, id: &NoteId) -> StoreResult<()> {
        match self.documents.remove(NOTES_COLLECTION, id).await {
            Ok(()) => {
                info!(note_id = %id, "Note deleted");
                Ok(())
            }
            Err(err) => {
                error!(note_id = %id, error = %err, "Error deleting note");
                Err(err)
            }
        }
    }
}

/// Map a stored document to a note. The document id wins over any `id` field.
pub fn note_from_document(document: Document) -> StoreResult<Note> {
    let Document { id, mut fields } = document;
    fields.insert("id".to_string(), Value::String(id.into_inner()));
    serde_json::from_value(Value::Object(fields)).map_err(|err| StoreError::Decode {
        reason: err.to_string(),
    })
}

fn notes_from_documents(documents: Vec<Document>) -> Vec<Note> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.id.clone();
            match note_from_document(document) {
                Ok(note) => Some(note),
                Err(err) => {
                    warn!(note_id = %id, error = %err, "Skipping malformed note document");
                    None
                }
            }
        })
        .collect()
}

fn to_fields<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StoreError::Decode {
            reason: format!("expected an object, got {}", other),
        }),
        Err(err) => Err(StoreError::Decode {
            reason: err.to_string(),
        }),
    }
}
