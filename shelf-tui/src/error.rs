//! Error types for the TUI.

use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use shelf_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
