//! Add/edit dialog overlay.

use crate::forms::FormField;
use crate::state::{App, Dialog};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, dialog: &Dialog, area: Rect) {
    let area = centered_rect(60, 60, area);
    f.render_widget(Clear, area);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = dialog.form.focus == field;
        let label_style = if focused {
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        let cursor = if focused { "▏" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>9}: ", field.label()), label_style),
            Span::styled(
                format!("{}{}", dialog.form.value(field), cursor),
                Style::default().fg(app.theme.text),
            ),
        ]));
    }
    lines.push(Line::from(""));
    if dialog.submitting {
        lines.push(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(app.theme.warning),
        )));
    }

    let block = Block::default()
        .title(dialog.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focus));
    let body = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
