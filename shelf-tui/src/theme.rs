//! Terminal theme and presentation-token colors.
//!
//! Notes carry utility-class style tokens (`bg-purple-100`,
//! `border-l-4 border-l-gray-500`). The terminal only needs the color family,
//! so tokens are reduced to the 500 shade of their palette entry.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;
use shelf_core::QueueStatus;

#[derive(Debug, Clone)]
pub struct ShelfTheme {
    pub primary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl ShelfTheme {
    pub fn paper() -> Self {
        Self {
            primary: Color::Rgb(99, 102, 241),
            success: Color::Rgb(34, 197, 94),
            warning: Color::Rgb(245, 158, 11),
            error: Color::Rgb(239, 68, 68),
            info: Color::Rgb(59, 130, 246),
            text: Color::Rgb(243, 244, 246),
            text_dim: Color::Rgb(156, 163, 175),
            border: Color::Rgb(107, 114, 128),
            border_focus: Color::Rgb(99, 102, 241),
        }
    }
}

impl Default for ShelfTheme {
    fn default() -> Self {
        Self::paper()
    }
}

/// Palette color named by a style token, if the token names a known family.
///
/// For multi-class tokens the last class decides.
pub fn token_color(token: &str) -> Option<Color> {
    let class = token.split_whitespace().last()?;
    class.split('-').find_map(family_color)
}

/// Border color for a card, falling back to the theme border.
pub fn card_border_color(token: &str, theme: &ShelfTheme) -> Color {
    token_color(token).unwrap_or(theme.border)
}

fn family_color(family: &str) -> Option<Color> {
    let (r, g, b) = match family {
        "gray" | "slate" | "zinc" | "neutral" | "stone" => (107, 114, 128),
        "red" => (239, 68, 68),
        "orange" => (249, 115, 22),
        "amber" => (245, 158, 11),
        "yellow" => (234, 179, 8),
        "lime" => (132, 204, 22),
        "green" => (34, 197, 94),
        "emerald" => (16, 185, 129),
        "teal" => (20, 184, 166),
        "cyan" => (6, 182, 212),
        "sky" => (14, 165, 233),
        "blue" => (59, 130, 246),
        "indigo" => (99, 102, 241),
        "violet" => (139, 92, 246),
        "purple" => (168, 85, 247),
        "fuchsia" => (217, 70, 239),
        "pink" => (236, 72, 153),
        "rose" => (244, 63, 94),
        _ => return None,
    };
    Some(Color::Rgb(r, g, b))
}

pub fn notification_color(level: NotificationLevel, theme: &ShelfTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

pub fn queue_status_color(status: QueueStatus, theme: &ShelfTheme) -> Color {
    match status {
        QueueStatus::ToRead => theme.text_dim,
        QueueStatus::Reading => theme.warning,
        QueueStatus::Done => theme.success,
    }
}
