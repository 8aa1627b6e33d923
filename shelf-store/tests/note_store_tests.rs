use chrono::Duration;
use proptest::prelude::*;
use shelf_core::CategoryCatalog;
use shelf_store::{NoteStore, OrderBy, NOTES_COLLECTION};
use shelf_test_utils::assertions::{assert_newest_first, assert_not_found};
use shelf_test_utils::fixtures::{draft_in, machine_learning_draft, sample_draft};
use shelf_test_utils::generators::{arb_draft, arb_patch};
use shelf_test_utils::{memory_client, Note, NoteId, NotePatch, SnapshotRecorder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_creates_end_on_the_current_collection() {
    let (client, store, clock) = memory_client();
    let client = Arc::new(client);
    let stalled = Arc::new(AtomicBool::new(false));
    let seen: Arc<Mutex<Vec<Vec<Note>>>> = Arc::new(Mutex::new(Vec::new()));

    let listener = {
        let stalled = stalled.clone();
        let seen = seen.clone();
        Arc::new(move |notes: Vec<Note>| {
            if notes.len() == 1 {
                stalled.store(true, Ordering::SeqCst);
                std::thread::sleep(StdDuration::from_millis(50));
            }
            seen.lock().unwrap().push(notes);
        })
    };
    let _sub = client.subscribe(listener).await.unwrap();

    let first = {
        let client = client.clone();
        tokio::spawn(async move { client.create(sample_draft("A")).await })
    };
    while !stalled.load(Ordering::SeqCst) {
        tokio::time::sleep(StdDuration::from_millis(1)).await;
    }
    clock.advance(Duration::seconds(1));
    let second = {
        let client = client.clone();
        tokio::spawn(async move { client.create(sample_draft("B")).await })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let stored = store
        .snapshot(NOTES_COLLECTION, &OrderBy::descending("createdAt"))
        .unwrap();
    let last = seen.lock().unwrap().last().cloned().unwrap();
    let delivered: Vec<_> = last.iter().map(|n| n.id.clone()).collect();
    let expected: Vec<_> = stored.into_iter().map(|d| d.id).collect();
    assert_eq!(delivered, expected);
    assert_eq!(last[0].title, "B");
}

#[tokio::test]
async fn snapshot_matches_store_contents_newest_first() {
    let (client, store, clock) = memory_client();
    for title in ["one", "two", "three"] {
        client.create(sample_draft(title)).await.unwrap();
        clock.advance(Duration::seconds(1));
    }

    let recorder = SnapshotRecorder::new();
    let _sub = client.subscribe(recorder.listener()).await.unwrap();

    assert_eq!(recorder.count(), 1);
    assert_eq!(recorder.last_titles(), vec!["three", "two", "one"]);
    let stored = store
        .snapshot(NOTES_COLLECTION, &OrderBy::descending("createdAt"))
        .unwrap();
    let delivered = recorder.last().unwrap();
    assert_eq!(stored.len(), delivered.len());
    for (doc, note) in stored.iter().zip(&delivered) {
        assert_eq!(doc.id, note.id);
    }
}

#[tokio::test]
async fn created_note_carries_category_colors_and_equal_timestamps() {
    let (client, _store, _clock) = memory_client();
    let recorder = SnapshotRecorder::new();
    let _sub = client.subscribe(recorder.listener()).await.unwrap();
    assert!(recorder.last().unwrap().is_empty());

    let id = client.create(machine_learning_draft()).await.unwrap();

    let notes = recorder.last().unwrap();
    assert_eq!(notes.len(), 1);
    let note = &notes[0];
    assert_eq!(note.id, id);
    assert_eq!(note.title, "A");
    assert_eq!(note.color, "bg-purple-100");
    assert_eq!(note.border_color, "border-l-purple-500");
    assert_eq!(note.created_at, note.updated_at);
}

#[tokio::test]
async fn delete_removes_only_the_target() {
    let (client, _store, clock) = memory_client();
    let recorder = SnapshotRecorder::new();
    let _sub = client.subscribe(recorder.listener()).await.unwrap();

    let first = client.create(sample_draft("first")).await.unwrap();
    clock.advance(Duration::milliseconds(10));
    let second = client.create(sample_draft("second")).await.unwrap();
    client.delete(&first).await.unwrap();

    let notes = recorder.last().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, second);
}

#[tokio::test]
async fn delete_of_missing_note_succeeds_without_change() {
    let (client, _store, _clock) = memory_client();
    let recorder = SnapshotRecorder::new();
    let _sub = client.subscribe(recorder.listener()).await.unwrap();
    client.create(sample_draft("kept")).await.unwrap();

    client.delete(&NoteId::new("missing")).await.unwrap();

    assert_eq!(recorder.last_titles(), vec!["kept"]);
}

#[tokio::test]
async fn update_of_missing_note_is_not_found() {
    let (client, _store, _clock) = memory_client();
    let missing = NoteId::new("missing");
    let result = client.update(&missing, NotePatch::default()).await;
    assert_not_found(&result, &missing);
}

#[tokio::test]
async fn recolor_does_not_restyle_existing_notes() {
    let (client, _store, clock) = memory_client();
    let mut catalog = CategoryCatalog::canonical();
    let recorder = SnapshotRecorder::new();
    let _sub = client.subscribe(recorder.listener()).await.unwrap();

    let id = client
        .create(draft_in("Economics", "Wealth of Nations"))
        .await
        .unwrap();
    assert!(catalog.recolor("Economics", "bg-red-100", "border-l-red-500"));
    assert_eq!(recorder.last().unwrap()[0].border_color, "border-l-green-500");

    clock.advance(Duration::seconds(1));
    let style = catalog.resolve("Economics");
    let patch = NotePatch {
        color: Some(style.color),
        border_color: Some(style.border_color),
        ..NotePatch::default()
    };
    client.update(&id, patch).await.unwrap();

    let note = &recorder.last().unwrap()[0];
    assert_eq!(note.border_color, "border-l-red-500");
    assert!(note.updated_at > note.created_at);
}

#[tokio::test]
async fn cancelled_subscription_receives_nothing_more() {
    let (client, store, _clock) = memory_client();
    let recorder = SnapshotRecorder::new();
    let sub = client.subscribe(recorder.listener()).await.unwrap();
    assert_eq!(store.watch_count(), 1);

    sub.cancel();
    client.create(sample_draft("late")).await.unwrap();

    assert_eq!(recorder.count(), 1);
    assert_eq!(store.watch_count(), 0);
}

#[tokio::test]
async fn every_subscriber_sees_every_write() {
    let (client, _store, _clock) = memory_client();
    let left = SnapshotRecorder::new();
    let right = SnapshotRecorder::new();
    let _left = client.subscribe(left.listener()).await.unwrap();
    let _right = client.subscribe(right.listener()).await.unwrap();

    client.create(sample_draft("shared")).await.unwrap();

    assert_eq!(left.last_titles(), vec!["shared"]);
    assert_eq!(right.last_titles(), vec!["shared"]);
}

#[derive(Debug, Clone)]
enum Op {
    Create {
        draft: shelf_test_utils::NoteDraft,
        advance_ms: i64,
    },
    Update {
        index: usize,
        patch: NotePatch,
    },
    Delete {
        index: usize,
    },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_draft(), 0i64..3).prop_map(|(draft, advance_ms)| Op::Create { draft, advance_ms }),
        1 => (any::<usize>(), arb_patch()).prop_map(|(index, patch)| Op::Update { index, patch }),
        1 => any::<usize>().prop_map(|index| Op::Delete { index }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any write sequence, the last snapshot lists exactly the live
    /// notes, newest first, ties in insertion order.
    #[test]
    fn prop_snapshot_tracks_writes(ops in prop::collection::vec(arb_op(), 1..24)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let (client, _store, clock) = memory_client();
            let recorder = SnapshotRecorder::new();
            let _sub = client.subscribe(recorder.listener()).await.unwrap();

            // (id, created_at millis) in insertion order
            let mut model: Vec<(NoteId, i64)> = Vec::new();
            let mut millis = 0i64;
            for op in ops {
                match op {
                    Op::Create { draft, advance_ms } => {
                        clock.advance(Duration::milliseconds(advance_ms));
                        millis += advance_ms;
                        let id = client.create(draft).await.unwrap();
                        model.push((id, millis));
                    }
                    Op::Update { index, patch } => {
                        if model.is_empty() {
                            continue;
                        }
                        let (id, _) = &model[index % model.len()];
                        client.update(id, patch).await.unwrap();
                    }
                    Op::Delete { index } => {
                        if model.is_empty() {
                            continue;
                        }
                        let (id, _) = model.remove(index % model.len());
                        client.delete(&id).await.unwrap();
                    }
                }
            }

            let mut expected = model.clone();
            expected.sort_by(|a, b| b.1.cmp(&a.1));
            let expected: Vec<NoteId> = expected.into_iter().map(|(id, _)| id).collect();

            let notes = recorder.last().unwrap();
            assert_newest_first(&notes);
            let delivered: Vec<NoteId> = notes.into_iter().map(|note| note.id).collect();
            assert_eq!(delivered, expected);
        });
    }
}
