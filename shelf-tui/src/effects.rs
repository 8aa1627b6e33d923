//! Store writes requested by the reducer.
//!
//! The reducer never calls the store itself. It returns an [`Effect`]; the
//! runtime executes it off the event loop and feeds the [`WriteOutcome`] back
//! through the event channel.

use crate::events::TuiEvent;
use shelf_core::{NoteDraft, NoteId, NotePatch, StoreResult};
use shelf_store::NoteStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Create(NoteDraft),
    Update { id: NoteId, patch: NotePatch },
    Delete(NoteId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(StoreResult<NoteId>),
    Updated { id: NoteId, result: StoreResult<()> },
    Deleted { id: NoteId, result: StoreResult<()> },
}

impl WriteOutcome {
    pub fn is_ok(&self) -> bool {
        match self {
            WriteOutcome::Created(result) => result.is_ok(),
            WriteOutcome::Updated { result, .. } | WriteOutcome::Deleted { result, .. } => {
                result.is_ok()
            }
        }
    }
}

pub async fn run_effect(store: &dyn NoteStore, effect: Effect) -> WriteOutcome {
    match effect {
        Effect::Create(draft) => WriteOutcome::Created(store.create(draft).await),
        Effect::Update { id, patch } => {
            let result = store.update(&id, patch).await;
            WriteOutcome::Updated { id, result }
        }
        Effect::Delete(id) => {
            let result = store.delete(&id).await;
            WriteOutcome::Deleted { id, result }
        }
    }
}

/// Run `effect` on its own task and report back through `sender`.
pub fn spawn_effect(
    store: Arc<dyn NoteStore>,
    effect: Effect,
    sender: mpsc::UnboundedSender<TuiEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = run_effect(store.as_ref(), effect).await;
        if sender.send(TuiEvent::WriteFinished(outcome)).is_err() {
            debug!("Event loop gone before write outcome was delivered");
        }
    })
}
