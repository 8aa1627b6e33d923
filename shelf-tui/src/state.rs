//! Application state and the view-state reducer.
//!
//! `App` owns everything the screen shows. It changes only on the event loop:
//! snapshots from the live subscription replace `notes` wholesale, and user
//! actions either change local state or return an [`Effect`] for the runtime
//! to run against the store. Writes never touch `notes` directly; their result
//! shows up through the next snapshot.

use crate::effects::{Effect, WriteOutcome};
use crate::events::TuiEvent;
use crate::forms::NoteForm;
use crate::keys::{Action, InputMode};
use crate::nav::ViewMode;
use crate::notifications::{push_capped, Notification, NotificationLevel};
use crate::theme::ShelfTheme;
use shelf_core::{
    date_stamp, CategoryCatalog, Note, NoteId, ReadingQueue, StoreResult, Timestamp,
};
use shelf_store::{NoteStore, SnapshotListener, Subscription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Add,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub form: NoteForm,
    /// Set while the write is in flight; repeated submits are ignored.
    pub submitting: bool,
}

impl Dialog {
    pub fn title(&self) -> &'static str {
        match self.kind {
            DialogKind::Add => "Add New Note",
            DialogKind::Edit => "Edit Note",
        }
    }
}

pub struct App {
    store: Arc<dyn NoteStore>,
    pub theme: ShelfTheme,

    pub notes: Vec<Note>,
    pub selected: Option<NoteId>,
    pub view_mode: ViewMode,
    pub categories: CategoryCatalog,

    pub dialog: Option<Dialog>,
    pub editing_note: Option<Note>,

    pub queue: ReadingQueue,
    pub queue_selected: Option<usize>,

    pub notifications: Vec<Notification>,
    pub should_quit: bool,

    subscription: Option<Subscription>,
}

impl App {
    pub fn new(store: Arc<dyn NoteStore>, categories: CategoryCatalog) -> Self {
        Self {
            store,
            theme: ShelfTheme::default(),
            notes: Vec::new(),
            selected: None,
            view_mode: ViewMode::default(),
            categories,
            dialog: None,
            editing_note: None,
            queue: ReadingQueue::new(),
            queue_selected: None,
            notifications: Vec::new(),
            should_quit: false,
            subscription: None,
        }
    }

    pub fn store(&self) -> Arc<dyn NoteStore> {
        self.store.clone()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Open the live subscription. Snapshots are forwarded to `sender` as
    /// [`TuiEvent::Snapshot`]. Calling this again while subscribed is a no-op.
    pub async fn activate(&mut self, sender: mpsc::UnboundedSender<TuiEvent>) -> StoreResult<()> {
        if self.subscription.is_some() {
            debug!("Already subscribed");
            return Ok(());
        }
        let listener: SnapshotListener = Arc::new(move |notes| {
            if sender.send(TuiEvent::Snapshot(notes)).is_err() {
                debug!("Snapshot dropped: event loop closed");
            }
        });
        match self.store.subscribe(listener).await {
            Ok(subscription) => {
                info!("View controller subscribed");
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Subscription failed");
                self.notify(
                    NotificationLevel::Error,
                    format!("Could not load notes: {}", err),
                );
                Err(err)
            }
        }
    }

    /// Cancel the subscription, if any.
    pub fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            info!("View controller unsubscribed");
        }
    }

    /// Whether snapshots are still arriving.
    pub fn is_live(&self) -> bool {
        self.subscription
            .as_ref()
            .map(Subscription::is_live)
            .unwrap_or(false)
    }

    pub fn input_mode(&self) -> InputMode {
        if self.dialog.is_some() {
            InputMode::Form
        } else {
            InputMode::Browse
        }
    }

    // ========================================================================
    // Store deliveries
    // ========================================================================

    /// Replace the note list with a fresh snapshot.
    pub fn apply_snapshot(&mut self, notes: Vec<Note>) {
        let previous_index = self.selected_index();
        self.notes = notes;

        let still_present = self
            .selected
            .as_ref()
            .is_some_and(|id| self.notes.iter().any(|n| &n.id == id));
        if !still_present {
            self.selected = if self.notes.is_empty() {
                None
            } else {
                let index = previous_index.unwrap_or(0).min(self.notes.len() - 1);
                Some(self.notes[index].id.clone())
            };
        }

        self.categories.refresh_counts(&self.notes);
        debug!(count = self.notes.len(), "Snapshot applied");
    }

    pub fn apply_outcome(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Created(Ok(id)) => {
                self.finish_dialog(DialogKind::Add);
                self.selected = Some(id);
                self.notify(NotificationLevel::Success, "Note created");
            }
            WriteOutcome::Created(Err(err)) => {
                error!(error = %err, "Error adding note");
                self.release_dialog(DialogKind::Add);
                self.notify(NotificationLevel::Error, format!("Could not add note: {}", err));
            }
            WriteOutcome::Updated { id, result: Ok(()) } => {
                self.finish_dialog(DialogKind::Edit);
                if self.editing_note.as_ref().is_some_and(|n| n.id == id) {
                    self.editing_note = None;
                }
                self.notify(NotificationLevel::Success, "Note updated");
            }
            WriteOutcome::Updated {
                id,
                result: Err(err),
            } => {
                error!(note_id = %id, error = %err, "Error updating note");
                self.release_dialog(DialogKind::Edit);
                self.notify(
                    NotificationLevel::Error,
                    format!("Could not update note: {}", err),
                );
            }
            WriteOutcome::Deleted { id, result: Ok(()) } => {
                info!(note_id = %id, "Delete confirmed");
                self.notify(NotificationLevel::Info, "Note deleted");
            }
            WriteOutcome::Deleted {
                id,
                result: Err(err),
            } => {
                error!(note_id = %id, error = %err, "Error deleting note");
                self.notify(
                    NotificationLevel::Error,
                    format!("Could not delete note: {}", err),
                );
            }
        }
    }

    fn finish_dialog(&mut self, kind: DialogKind) {
        if self
            .dialog
            .as_ref()
            .is_some_and(|d| d.kind == kind && d.submitting)
        {
            self.dialog = None;
        }
    }

    fn release_dialog(&mut self, kind: DialogKind) {
        if let Some(dialog) = self.dialog.as_mut().filter(|d| d.kind == kind) {
            dialog.submitting = false;
        }
    }

    // ========================================================================
    // User actions
    // ========================================================================

    /// Apply a user action. Returns the store write to run, if any.
    pub fn dispatch(&mut self, action: Action, now: Timestamp) -> Option<Effect> {
        match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::Submit => self.submit_dialog(now),
            Action::Cancel => {
                self.close_dialog();
                None
            }
            Action::NewNote => {
                self.open_add_dialog();
                None
            }
            Action::EditNote => {
                self.open_edit_dialog();
                None
            }
            Action::DeleteNote => self.request_delete(),
            Action::ToggleViewMode => {
                self.toggle_view_mode();
                None
            }
            Action::MoveUp => {
                self.move_selection(-(self.view_mode.columns() as isize));
                None
            }
            Action::MoveDown => {
                self.move_selection(self.view_mode.columns() as isize);
                None
            }
            Action::MoveLeft => {
                self.move_selection(-1);
                None
            }
            Action::MoveRight => {
                self.move_selection(1);
                None
            }
            Action::AddCategory => {
                self.add_category();
                None
            }
            Action::Enqueue => {
                self.enqueue_selected(now);
                None
            }
            Action::QueuePrev => {
                self.move_queue_selection(false);
                None
            }
            Action::QueueNext => {
                self.move_queue_selection(true);
                None
            }
            Action::AdvanceQueue => {
                self.advance_queue();
                None
            }
            Action::NextField | Action::PrevField => {
                if let Some(dialog) = self.dialog.as_mut() {
                    if action == Action::NextField {
                        dialog.form.focus_next();
                    } else {
                        dialog.form.focus_prev();
                    }
                }
                None
            }
            Action::NextCategory | Action::PrevCategory => {
                let names = self.categories.names();
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog
                        .form
                        .cycle_category(&names, action == Action::NextCategory);
                }
                None
            }
            Action::Input(c) => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.form.push_char(c);
                }
                None
            }
            Action::Backspace => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.form.pop_char();
                }
                None
            }
        }
    }

    pub fn open_add_dialog(&mut self) {
        let first = self.categories.names().first().map(|n| n.to_string());
        self.editing_note = None;
        self.dialog = Some(Dialog {
            kind: DialogKind::Add,
            form: NoteForm::new(first.as_deref()),
            submitting: false,
        });
    }

    /// Open the edit dialog for the selected note.
    pub fn open_edit_dialog(&mut self) {
        let Some(note) = self.selected_note().cloned() else {
            return;
        };
        self.dialog = Some(Dialog {
            kind: DialogKind::Edit,
            form: NoteForm::from_note(&note),
            submitting: false,
        });
        self.editing_note = Some(note);
    }

    pub fn close_dialog(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            if dialog.kind == DialogKind::Edit {
                self.editing_note = None;
            }
        }
    }

    /// Validate the open dialog and turn it into a store write.
    pub fn submit_dialog(&mut self, now: Timestamp) -> Option<Effect> {
        let (submitting, validation) = {
            let dialog = self.dialog.as_ref()?;
            (dialog.submitting, dialog.form.validate())
        };
        if submitting {
            debug!("Submit ignored: write already in flight");
            return None;
        }
        if let Err(err) = validation {
            self.notify(NotificationLevel::Warning, err.to_string());
            return None;
        }

        let dialog = self.dialog.as_ref()?;
        let style = self.categories.resolve(&dialog.form.category);
        let effect = match dialog.kind {
            DialogKind::Add => Effect::Create(dialog.form.to_draft(style, date_stamp(now))),
            DialogKind::Edit => {
                let Some(note) = self.editing_note.as_ref() else {
                    warn!("Edit dialog open without a note");
                    return None;
                };
                Effect::Update {
                    id: note.id.clone(),
                    patch: dialog.form.to_patch(style),
                }
            }
        };
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.submitting = true;
        }
        Some(effect)
    }

    /// Delete the selected note. No confirmation and no local removal; the
    /// note disappears when the next snapshot arrives.
    pub fn request_delete(&mut self) -> Option<Effect> {
        self.selected.clone().map(Effect::Delete)
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggle();
    }

    pub fn add_category(&mut self) {
        let name = self.categories.add_placeholder().name.clone();
        self.notify(NotificationLevel::Info, format!("Added category '{}'", name));
    }

    pub fn enqueue_selected(&mut self, now: Timestamp) {
        let Some(note) = self.selected_note().cloned() else {
            return;
        };
        self.queue.push_note(&note, now);
        self.queue_selected = Some(self.queue.len() - 1);
        self.notify(
            NotificationLevel::Info,
            format!("Queued '{}'", note.title),
        );
    }

    pub fn advance_queue(&mut self) {
        if let Some(index) = self.queue_selected {
            self.queue.advance(index);
        }
    }

    fn move_queue_selection(&mut self, forward: bool) {
        if self.queue.is_empty() {
            self.queue_selected = None;
            return;
        }
        let last = self.queue.len() - 1;
        self.queue_selected = Some(match self.queue_selected {
            None => 0,
            Some(i) if forward => (i + 1).min(last),
            Some(i) => i.saturating_sub(1),
        });
    }

    fn move_selection(&mut self, delta: isize) {
        if self.notes.is_empty() {
            self.selected = None;
            return;
        }
        let last = self.notes.len() as isize - 1;
        let next = match self.selected_index() {
            None => 0,
            Some(i) => (i as isize + delta).clamp(0, last),
        };
        self.selected = Some(self.notes[next as usize].id.clone());
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_ref()?;
        self.notes.iter().position(|n| &n.id == id)
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected_index().map(|i| &self.notes[i])
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        push_capped(&mut self.notifications, Notification::new(level, message));
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.teardown();
    }
}
