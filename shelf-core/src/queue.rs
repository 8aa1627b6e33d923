//! Reading queue: a local, append-only list of notes the user wants to read.

use crate::identity::{date_stamp, Timestamp};
use crate::note::Note;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    ToRead,
    Reading,
    Done,
}

impl QueueStatus {
    pub fn next(self) -> Self {
        match self {
            QueueStatus::ToRead => QueueStatus::Reading,
            QueueStatus::Reading => QueueStatus::Done,
            QueueStatus::Done => QueueStatus::ToRead,
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueueStatus::ToRead => "to read",
            QueueStatus::Reading => "reading",
            QueueStatus::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub title: String,
    pub category: String,
    pub status: QueueStatus,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingQueue {
    items: Vec<QueueItem>,
}

impl ReadingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `note` with status [`QueueStatus::ToRead`], dated `now`.
    pub fn push_note(&mut self, note: &Note, now: Timestamp) -> &QueueItem {
        let index = self.items.len();
        self.items.push(QueueItem {
            title: note.title.clone(),
            category: note.category.clone(),
            status: QueueStatus::ToRead,
            date: date_stamp(now),
        });
        &self.items[index]
    }

    /// Move the entry at `index` to its next status.
    pub fn advance(&mut self, index: usize) -> Option<QueueStatus> {
        let item = self.items.get_mut(index)?;
        item.status = item.status.next();
        Some(item.status)
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
