//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ToggleViewMode,
    NewNote,
    EditNote,
    DeleteNote,
    AddCategory,
    Enqueue,
    QueuePrev,
    QueueNext,
    AdvanceQueue,
    // Dialog editing
    Submit,
    Cancel,
    NextField,
    PrevField,
    NextCategory,
    PrevCategory,
    Input(char),
    Backspace,
}

/// Which keymap applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Form,
}

pub fn map_key(event: KeyEvent, mode: InputMode) -> Option<Action> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match mode {
        InputMode::Browse => map_browse(code),
        InputMode::Form => map_form(code),
    }
}

fn map_browse(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('v') => Some(Action::ToggleViewMode),
        KeyCode::Char('n') => Some(Action::NewNote),
        KeyCode::Char('e') | KeyCode::Enter => Some(Action::EditNote),
        KeyCode::Char('d') | KeyCode::Delete => Some(Action::DeleteNote),
        KeyCode::Char('c') => Some(Action::AddCategory),
        KeyCode::Char('a') => Some(Action::Enqueue),
        KeyCode::Char('[') => Some(Action::QueuePrev),
        KeyCode::Char(']') => Some(Action::QueueNext),
        KeyCode::Char('r') => Some(Action::AdvanceQueue),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::MoveRight),
        _ => None,
    }
}

fn map_form(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Tab => Some(Action::NextField),
        KeyCode::BackTab => Some(Action::PrevField),
        KeyCode::Down => Some(Action::NextCategory),
        KeyCode::Up => Some(Action::PrevCategory),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => Some(Action::Input(c)),
        _ => None,
    }
}
