//! In-memory document store.
//!
//! Stands in for the real database in tests and in the offline backend.
//! Every successful mutation synchronously delivers a fresh snapshot to every
//! live watch on the mutated collection before the call returns. Listeners run
//! after the store lock is released, so a listener may read the store.
//!
//! Each mutation bumps the store version and stamps its snapshots with it.
//! Writers on different threads may reach their deliveries in any order; the
//! per-watch [`DeliveryGate`] drops any snapshot older than one already
//! delivered, so the last snapshot a listener sees is the latest state.

use crate::document::{Document, DocumentListener, DocumentStore, Fields, OrderBy};
use crate::subscription::{DeliveryGate, Subscription};
use async_trait::async_trait;
use shelf_core::{new_document_id, NoteId, StoreError, StoreResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock, Weak};
use tracing::debug;

struct Watch {
    collection: String,
    order: OrderBy,
    listener: DocumentListener,
    gate: Arc<DeliveryGate>,
}

#[derive(Default)]
struct Inner {
    /// Documents per collection, in insertion order.
    collections: HashMap<String, Vec<Document>>,
    watches: HashMap<u64, Watch>,
    next_watch_id: u64,
    /// Bumped by every successful mutation.
    version: u64,
    write_failure: Option<StoreError>,
}

impl Inner {
    fn snapshot(&self, collection: &str, order: &OrderBy) -> Vec<Document> {
        let mut documents = self.collections.get(collection).cloned().unwrap_or_default();
        order.apply(&mut documents);
        documents
    }

    fn pending_deliveries(&self, collection: &str) -> Vec<Delivery> {
        self.watches
            .values()
            .filter(|watch| watch.collection == collection)
            .map(|watch| Delivery {
                listener: watch.listener.clone(),
                gate: watch.gate.clone(),
                version: self.version,
                documents: self.snapshot(collection, &watch.order),
            })
            .collect()
    }

    fn check_writable(&self) -> StoreResult<()> {
        match &self.write_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

struct Delivery {
    listener: DocumentListener,
    gate: Arc<DeliveryGate>,
    version: u64,
    documents: Vec<Document>,
}

impl Delivery {
    fn run(self) {
        let Delivery {
            listener,
            gate,
            version,
            documents,
        } = self;
        if !gate.deliver(version, move || listener(documents)) {
            debug!(version = version, "Skipped stale or cancelled delivery");
        }
    }
}

/// In-memory store with synchronous change delivery.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `error` until [`Self::restore_writes`].
    pub fn fail_writes(&self, error: StoreError) {
        if let Ok(mut inner) = self.inner.write() {
            inner.write_failure = Some(error);
        }
    }

    pub fn restore_writes(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.write_failure = None;
        }
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.inner
            .read()
            .map(|inner| inner.collections.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Number of open watches across all collections.
    pub fn watch_count(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.watches.len())
            .unwrap_or(0)
    }

    pub fn get(&self, collection: &str, id: &NoteId) -> Option<Document> {
        let inner = self.inner.read().ok()?;
        inner
            .collections
            .get(collection)?
            .iter()
            .find(|doc| &doc.id == id)
            .cloned()
    }

    /// Ordered contents of `collection`, exactly as a watch would see them.
    pub fn snapshot(&self, collection: &str, order: &OrderBy) -> StoreResult<Vec<Document>> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.snapshot(collection, order))
    }

    /// Run `mutate` under the write lock, then deliver snapshots outside it.
    fn mutate<R>(
        &self,
        collection: &str,
        mutate: impl FnOnce(&mut Vec<Document>) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let (result, deliveries) = {
            let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
            inner.check_writable()?;
            let documents = inner.collections.entry(collection.to_string()).or_default();
            let result = mutate(documents)?;
            inner.version += 1;
            (result, inner.pending_deliveries(collection))
        };
        debug!(
            collection = collection,
            watches = deliveries.len(),
            "Delivering snapshots"
        );
        for delivery in deliveries {
            delivery.run();
        }
        Ok(result)
    }
}

impl fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("watches", &self.watch_count())
            .finish()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<NoteId> {
        self.mutate(collection, |documents| {
            let id = new_document_id();
            documents.push(Document {
                id: id.clone(),
                fields,
            });
            Ok(id)
        })
    }

    async fn patch(&self, collection: &str, id: &NoteId, fields: Fields) -> StoreResult<()> {
        self.mutate(collection, |documents| {
            let document = documents
                .iter_mut()
                .find(|doc| &doc.id == id)
                .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
            for (key, value) in fields {
                document.fields.insert(key, value);
            }
            Ok(())
        })
    }

    async fn remove(&self, collection: &str, id: &NoteId) -> StoreResult<()> {
        // Removing a missing id is a successful no-op; watchers still get a
        // (possibly unchanged) snapshot.
        self.mutate(collection, |documents| {
            documents.retain(|doc| &doc.id != id);
            Ok(())
        })
    }

    async fn watch(
        &self,
        collection: &str,
        order: OrderBy,
        listener: DocumentListener,
    ) -> StoreResult<Subscription> {
        let gate = Arc::new(DeliveryGate::new(Arc::new(AtomicBool::new(true))));
        let (watch_id, initial) = {
            let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
            let watch_id = inner.next_watch_id;
            inner.next_watch_id += 1;
            let initial = Delivery {
                listener: listener.clone(),
                gate: gate.clone(),
                version: inner.version,
                documents: inner.snapshot(collection, &order),
            };
            inner.watches.insert(
                watch_id,
                Watch {
                    collection: collection.to_string(),
                    order,
                    listener,
                    gate: gate.clone(),
                },
            );
            (watch_id, initial)
        };
        debug!(collection = collection, watch_id = watch_id, "Watch opened");
        initial.run();

        let registry: Weak<RwLock<Inner>> = Arc::downgrade(&self.inner);
        let live = gate.live();
        Ok(Subscription::new(live, move || {
            gate.drain();
            if let Some(inner) = registry.upgrade() {
                if let Ok(mut inner) = inner.write() {
                    inner.watches.remove(&watch_id);
                }
            }
            debug!(watch_id = watch_id, "Watch released");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    fn fields(title: &str, created_at: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), json!(title));
        fields.insert("createdAt".to_string(), json!(created_at));
        fields
    }

    fn recorder() -> (DocumentListener, Arc<Mutex<Vec<Vec<Document>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: DocumentListener = Arc::new(move |docs| {
            sink.lock().unwrap().push(docs);
        });
        (listener, seen)
    }

    #[tokio::test]
    async fn test_watch_delivers_initial_snapshot() {
        let store = InMemoryDocumentStore::new();
        store
            .insert("notes", fields("a", "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        let (listener, seen) = recorder();
        let _sub = store
            .watch("notes", OrderBy::descending("createdAt"), listener)
            .await
            .unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_deliver_synchronously() {
        let store = InMemoryDocumentStore::new();
        let (listener, seen) = recorder();
        let _sub = store
            .watch("notes", OrderBy::descending("createdAt"), listener)
            .await
            .unwrap();
        let id = store
            .insert("notes", fields("a", "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
        store.remove("notes", &id).await.unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[2].is_empty());
    }

    #[tokio::test]
    async fn test_other_collections_do_not_notify() {
        let store = InMemoryDocumentStore::new();
        let (listener, seen) = recorder();
        let _sub = store
            .watch("notes", OrderBy::descending("createdAt"), listener)
            .await
            .unwrap();
        store
            .insert("drafts", fields("a", "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_patch_missing_document_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .patch("notes", &NoteId::new("missing"), Fields::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                id: NoteId::new("missing")
            }
        );
    }

    #[tokio::test]
    async fn test_patch_merges_fields() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert("notes", fields("a", "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        let mut patch = Fields::new();
        patch.insert("title".to_string(), json!("b"));
        store.patch("notes", &id, patch).await.unwrap();
        let doc = store.get("notes", &id).unwrap();
        assert_eq!(doc.fields["title"], json!("b"));
        assert_eq!(doc.fields["createdAt"], json!("2024-01-01T00:00:00.000Z"));
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let store = InMemoryDocumentStore::new();
        assert!(store.remove("notes", &NoteId::new("nope")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_collection_untouched() {
        let store = InMemoryDocumentStore::new();
        let (listener, seen) = recorder();
        let _sub = store
            .watch("notes", OrderBy::descending("createdAt"), listener)
            .await
            .unwrap();
        store.fail_writes(StoreError::unavailable("offline"));
        assert!(store
            .insert("notes", fields("a", "2024-01-01T00:00:00.000Z"))
            .await
            .is_err());
        assert_eq!(store.document_count("notes"), 0);
        assert_eq!(seen.lock().unwrap().len(), 1);

        store.restore_writes();
        assert!(store
            .insert("notes", fields("a", "2024-01-01T00:00:00.000Z"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery_and_releases_watch() {
        let store = InMemoryDocumentStore::new();
        let (listener, seen) = recorder();
        let sub = store
            .watch("notes", OrderBy::descending("createdAt"), listener)
            .await
            .unwrap();
        assert_eq!(store.watch_count(), 1);
        sub.cancel();
        assert_eq!(store.watch_count(), 0);
        store
            .insert("notes", fields("a", "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    /// Listener that stalls on one-document snapshots, the way a descheduled
    /// delivery thread would, and records every snapshot after the stall.
    fn stalling_recorder(
        entered: Arc<AtomicBool>,
    ) -> (DocumentListener, Arc<Mutex<Vec<Vec<Document>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: DocumentListener = Arc::new(move |docs: Vec<Document>| {
            if docs.len() == 1 {
                entered.store(true, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
            sink.lock().unwrap().push(docs);
        });
        (listener, seen)
    }

    async fn wait_for(flag: &AtomicBool) {
        while !flag.load(Ordering::SeqCst) {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_writes_leave_latest_snapshot_last() {
        let store = InMemoryDocumentStore::new();
        let entered = Arc::new(AtomicBool::new(false));
        let (listener, seen) = stalling_recorder(entered.clone());
        let _sub = store
            .watch("notes", OrderBy::descending("createdAt"), listener)
            .await
            .unwrap();

        let first = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert("notes", fields("A", "2024-01-01T00:00:00.000Z"))
                    .await
            })
        };
        wait_for(&entered).await;
        let second = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert("notes", fields("B", "2024-01-01T00:00:01.000Z"))
                    .await
            })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(store.document_count("notes"), 2);
        let seen = seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last.len(), 2);
        assert!(seen.iter().all(|docs| docs.len() <= last.len()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_waits_for_in_flight_delivery() {
        let store = InMemoryDocumentStore::new();
        let entered = Arc::new(AtomicBool::new(false));
        let (listener, seen) = stalling_recorder(entered.clone());
        let sub = store
            .watch("notes", OrderBy::descending("createdAt"), listener)
            .await
            .unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert("notes", fields("A", "2024-01-01T00:00:00.000Z"))
                    .await
            })
        };
        wait_for(&entered).await;
        sub.cancel();
        // The stalled delivery finished before cancel returned.
        let delivered = seen.lock().unwrap().len();
        assert_eq!(delivered, 2);

        writer.await.unwrap().unwrap();
        store
            .insert("notes", fields("B", "2024-01-01T00:00:01.000Z"))
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap().len(), delivered);
        assert_eq!(store.watch_count(), 0);
    }

    #[tokio::test]
    async fn test_listener_may_read_store_during_delivery() {
        let store = InMemoryDocumentStore::new();
        let reentrant = store.clone();
        let listener: DocumentListener = Arc::new(move |_docs| {
            // Reads from inside a delivery must not deadlock.
            let _ = reentrant.document_count("notes");
        });
        let _sub = store
            .watch("notes", OrderBy::descending("createdAt"), listener)
            .await
            .unwrap();
        store
            .insert("notes", fields("a", "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        assert_eq!(store.document_count("notes"), 1);
    }
}
