//! Shelf Test Utilities
//!
//! Shared test infrastructure for the shelf workspace:
//! - Fixtures for notes, drafts and in-memory store clients
//! - A snapshot recorder for subscription callbacks
//! - Proptest generators for drafts and patches
//! - Assertions over store results

pub use shelf_core::{
    Category, CategoryCatalog, CategorySource, CategoryStyle, Clock, CountPolicy, FixedClock,
    ManualClock, Note, NoteDraft, NoteId, NotePatch, StoreError, StoreOp, StoreResult, Timestamp,
};
pub use shelf_store::{
    InMemoryDocumentStore, NoteStore, NoteStoreClient, SnapshotListener, Subscription,
    NOTES_COLLECTION,
};

use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};

/// Client over a fresh in-memory store, driven by a manual clock.
pub type MemoryClient = NoteStoreClient<InMemoryDocumentStore>;

/// Fixed starting instant for manual clocks: 2024-04-01T12:00:00Z.
pub fn epoch() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Build a client, the store behind it, and the clock it stamps with.
pub fn memory_client() -> (MemoryClient, InMemoryDocumentStore, Arc<ManualClock>) {
    let store = InMemoryDocumentStore::new();
    let clock = Arc::new(ManualClock::new(epoch()));
    let client = NoteStoreClient::with_clock(store.clone(), clock.clone());
    (client, store, clock)
}

// ============================================================================
// SNAPSHOT RECORDER
// ============================================================================

/// Collects every snapshot a subscription delivers.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecorder {
    snapshots: Arc<Mutex<Vec<Vec<Note>>>>,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> SnapshotListener {
        let sink = self.snapshots.clone();
        Arc::new(move |notes| {
            if let Ok(mut snapshots) = sink.lock() {
                snapshots.push(notes);
            }
        })
    }

    /// Number of snapshots received so far.
    pub fn count(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn last(&self) -> Option<Vec<Note>> {
        self.snapshots.lock().ok().and_then(|s| s.last().cloned())
    }

    /// Titles of the most recent snapshot, in delivery order.
    pub fn last_titles(&self) -> Vec<String> {
        self.last()
            .unwrap_or_default()
            .into_iter()
            .map(|note| note.title)
            .collect()
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common scenarios.

    use super::*;

    /// Draft filed under `category`, styled from the canonical catalog.
    pub fn draft_in(category: &str, title: &str) -> NoteDraft {
        let style = CategoryCatalog::canonical().resolve(category);
        NoteDraft {
            title: title.to_string(),
            content: format!("Notes on {}", title),
            category: category.to_string(),
            authors: "Test Author".to_string(),
            date: "2024".to_string(),
            color: style.color,
            border_color: style.border_color,
        }
    }

    pub fn sample_draft(title: &str) -> NoteDraft {
        draft_in("Philosophy", title)
    }

    /// The draft a user produces by filing "A" under Machine learning.
    pub fn machine_learning_draft() -> NoteDraft {
        NoteDraft {
            title: "A".to_string(),
            content: String::new(),
            category: "Machine learning".to_string(),
            authors: "X".to_string(),
            date: "2024".to_string(),
            color: "bg-purple-100".to_string(),
            border_color: "border-l-purple-500".to_string(),
        }
    }

    /// A stored note, as a snapshot would deliver it.
    pub fn test_note(id: &str, title: &str, created_at: Timestamp) -> Note {
        let draft = sample_draft(title);
        Note {
            id: NoteId::new(id),
            title: draft.title,
            content: draft.content,
            category: draft.category,
            authors: draft.authors,
            date: draft.date,
            color: draft.color,
            border_color: draft.border_color,
            created_at,
            updated_at: created_at,
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for note payloads.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_category_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Machine learning".to_string()),
            Just("Neuroscience".to_string()),
            Just("Philosophy".to_string()),
            Just("Economics".to_string()),
            "[A-Z][a-z]{2,12}",
        ]
    }

    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,30}"
    }

    pub fn arb_draft() -> impl Strategy<Value = NoteDraft> {
        (arb_title(), ".{0,80}", arb_category_name(), "[A-Za-z .]{1,24}").prop_map(
            |(title, content, category, authors)| {
                let style = CategoryCatalog::canonical().resolve(&category);
                NoteDraft {
                    title,
                    content,
                    category,
                    authors,
                    date: "2024".to_string(),
                    color: style.color,
                    border_color: style.border_color,
                }
            },
        )
    }

    pub fn arb_patch() -> impl Strategy<Value = NotePatch> {
        (
            proptest::option::of(arb_title()),
            proptest::option::of(".{0,80}"),
            proptest::option::of(arb_category_name()),
        )
            .prop_map(|(title, content, category)| NotePatch {
                title,
                content,
                category,
                ..NotePatch::default()
            })
    }

    /// Timestamps in 2020-2030 at whole milliseconds.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800_000i64..1_893_456_000_000i64).prop_map(|millis| {
            chrono::DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
        })
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over store results.

    use super::*;

    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &StoreResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &StoreResult<T>, expected: &NoteId) {
        match result {
            Err(StoreError::NotFound { id }) => assert_eq!(id, expected, "Wrong id in NotFound"),
            other => panic!("Expected NotFound for {}, got: {:?}", expected, other),
        }
    }

    /// Assert notes are ordered newest first.
    #[track_caller]
    pub fn assert_newest_first(notes: &[Note]) {
        for pair in notes.windows(2) {
            assert!(
                pair[0].created_at >= pair[1].created_at,
                "{} ({}) listed before newer {} ({})",
                pair[0].title,
                pair[0].created_at,
                pair[1].title,
                pair[1].created_at
            );
        }
    }
}
