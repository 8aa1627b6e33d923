//! Event types for the TUI event loop.

use crate::effects::WriteOutcome;
use crossterm::event::KeyEvent;
use shelf_core::Note;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Resize { width: u16, height: u16 },
    /// Full ordered note list from the live subscription.
    Snapshot(Vec<Note>),
    WriteFinished(WriteOutcome),
}
