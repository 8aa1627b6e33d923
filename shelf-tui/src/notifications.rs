//! Notification system for the TUI.

use chrono::{DateTime, Utc};

/// Oldest notifications are dropped past this many.
pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self.level {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "SUCCESS",
        }
    }
}

/// Append `notification`, keeping at most [`MAX_NOTIFICATIONS`].
pub fn push_capped(list: &mut Vec<Notification>, notification: Notification) {
    list.push(notification);
    if list.len() > MAX_NOTIFICATIONS {
        let excess = list.len() - MAX_NOTIFICATIONS;
        list.drain(..excess);
    }
}
