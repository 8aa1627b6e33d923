//! View rendering dispatch.

pub mod dialog;
pub mod library;
pub mod sidebar;

use crate::state::App;
use crate::theme::notification_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Width of the category/queue sidebar, in columns.
const SIDEBAR_WIDTH: u16 = 32;

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(layout[1]);
    sidebar::render(f, app, body[0]);
    library::render(f, app, body[1]);

    render_footer(f, app, layout[2]);

    if let Some(dialog) = app.dialog.as_ref() {
        dialog::render(f, app, dialog, f.size());
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let status = if app.is_live() { "Live" } else { "Offline" };
    let title = format!(
        "Shelf | {} notes | {} view | {}",
        app.notes.len(),
        app.view_mode.title(),
        status
    );
    let color = if app.is_live() {
        app.theme.primary
    } else {
        app.theme.warning
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(color)));
    f.render_widget(block, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = if app.dialog.is_some() {
        "Tab next field • ↑/↓ category • Enter save • Esc cancel"
    } else {
        "h/j/k/l move • v view • n new • e edit • d delete • c category • a queue • [/] r queue • q quit"
    };
    let (text, style) = match app.notifications.last() {
        Some(note) => (
            format!("{}: {}", note.label(), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}
