//! Category list and reading queue.

use crate::state::App;
use crate::theme::{queue_status_color, token_color};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let categories: Vec<ListItem> = app
        .categories
        .categories()
        .iter()
        .map(|category| {
            let accent = token_color(&category.accent_color).unwrap_or(app.theme.border);
            ListItem::new(Line::from(vec![
                Span::styled("▌ ", Style::default().fg(accent)),
                Span::raw(category.name.clone()),
                Span::styled(
                    format!(" ({})", category.count),
                    Style::default().fg(app.theme.text_dim),
                ),
            ]))
        })
        .collect();
    let categories = List::new(categories)
        .block(Block::default().title("Categories").borders(Borders::ALL));
    f.render_widget(categories, chunks[0]);

    let queue: Vec<ListItem> = app
        .queue
        .items()
        .iter()
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", item.status),
                    Style::default().fg(queue_status_color(item.status, &app.theme)),
                ),
                Span::raw(item.title.clone()),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    state.select(app.queue_selected);
    let queue = List::new(queue)
        .block(Block::default().title("Reading queue").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(queue, chunks[1], &mut state);
}
