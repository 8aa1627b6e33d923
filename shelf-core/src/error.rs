//! Error types for store operations

use crate::identity::NoteId;
use std::fmt;
use thiserror::Error;

/// The store operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Subscribe,
    Create,
    Update,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::Subscribe => "subscribe",
            StoreOp::Create => "create",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Store layer errors.
///
/// Covers both write failures (network, permission, not-found on patch) and
/// the store being unreachable when a subscription is opened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Note not found: {id}")]
    NotFound { id: NoteId },

    #[error("Permission denied for {op}")]
    PermissionDenied { op: StoreOp },

    #[error("Store {op} failed: {reason}")]
    Write { op: StoreOp, reason: String },

    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Malformed document: {reason}")]
    Decode { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn write(op: StoreOp, reason: impl Into<String>) -> Self {
        Self::Write {
            op,
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
