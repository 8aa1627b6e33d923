//! Shelf TUI library exports.

pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod forms;
pub mod keys;
pub mod logging;
pub mod nav;
pub mod notifications;
pub mod persistence;
pub mod state;
pub mod theme;
pub mod views;
