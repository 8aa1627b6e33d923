//! Shelf Store - note-store synchronization contract
//!
//! The [`NoteStore`] trait is the only way the rest of the workspace talks to
//! the document database. [`NoteStoreClient`] implements it on top of any
//! [`DocumentStore`] backend: the in-memory fake used by tests and the offline
//! mode, or the remote HTTP/WebSocket store.

pub mod client;
pub mod document;
pub mod memory;
pub mod remote;
pub mod subscription;

pub use client::{note_from_document, NoteStoreClient};
pub use document::{Direction, Document, DocumentListener, DocumentStore, Fields, OrderBy};
pub use memory::InMemoryDocumentStore;
pub use remote::{RemoteDocumentStore, RemoteStoreSettings};
pub use subscription::{DeliveryGate, Subscription};

use async_trait::async_trait;
use shelf_core::{Note, NoteDraft, NoteId, NotePatch, StoreResult};
use std::sync::Arc;

/// Collection holding note documents.
pub const NOTES_COLLECTION: &str = "notes";

/// Callback receiving the full, ordered note list on every change.
pub type SnapshotListener = Arc<dyn Fn(Vec<Note>) + Send + Sync>;

/// The four-operation contract against the live `notes` collection.
///
/// Writes never touch caller state; their effect becomes visible only through
/// the next snapshot delivered to subscribers.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Open a live query ordered by creation time, newest first.
    ///
    /// `on_snapshot` receives the complete result set once on subscribe and
    /// again after every change from any writer. Dropping or cancelling the
    /// returned [`Subscription`] stops delivery.
    async fn subscribe(&self, on_snapshot: SnapshotListener) -> StoreResult<Subscription>;

    /// Insert a note, stamping both timestamps. Returns the store-assigned id.
    async fn create(&self, draft: NoteDraft) -> StoreResult<NoteId>;

    /// Apply a partial patch and stamp `updatedAt`.
    async fn update(&self, id: &NoteId, patch: NotePatch) -> StoreResult<()>;

    /// Remove a note permanently. Best-effort: confirm through the subscription.
    async fn delete(&self, id: &NoteId) -> StoreResult<()>;
}
