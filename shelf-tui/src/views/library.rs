//! Note library: cards in delivery order, one column (list) or three (grid).

use crate::state::App;
use crate::theme::card_border_color;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use shelf_core::Note;

pub const EMPTY_MESSAGE: &str = "No notes yet. Press n to create your first note.";

/// Rows taken by one card, borders included.
const CARD_HEIGHT: u16 = 5;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Library")
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.notes.is_empty() {
        let empty = Paragraph::new(EMPTY_MESSAGE)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.text_dim))
            .wrap(Wrap { trim: true });
        f.render_widget(empty, inner);
        return;
    }

    let columns = app.view_mode.columns();
    let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = app.selected_index().unwrap_or(0) / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let rows: Vec<&[Note]> = app.notes.chunks(columns).collect();
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(inner);

    for (row_area, row) in row_areas.iter().zip(rows.iter().skip(first_row)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);
        for (cell, note) in cells.iter().zip(row.iter()) {
            render_card(f, app, note, *cell);
        }
    }
}

fn render_card(f: &mut Frame<'_>, app: &App, note: &Note, area: Rect) {
    let selected = app.selected.as_ref() == Some(&note.id);
    let border = card_border_color(&note.border_color, &app.theme);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if selected {
            BorderType::Thick
        } else {
            BorderType::Plain
        })
        .border_style(Style::default().fg(border));

    let lines = vec![
        Line::from(Span::styled(
            format!("{} • {}", note.date, note.category),
            Style::default().fg(app.theme.text_dim),
        )),
        Line::from(Span::styled(
            note.title.clone(),
            Style::default()
                .fg(app.theme.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            note.authors.clone(),
            Style::default().fg(app.theme.text_dim),
        )),
    ];
    let card = Paragraph::new(lines).block(block);
    f.render_widget(card, area);
}
