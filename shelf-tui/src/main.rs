//! Shelf TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use shelf_core::{Clock, SystemClock};
use shelf_store::{InMemoryDocumentStore, NoteStore, NoteStoreClient, RemoteDocumentStore};
use shelf_tui::config::{ConfigError, ShelfConfig, StoreBackend};
use shelf_tui::effects::spawn_effect;
use shelf_tui::error::TuiError;
use shelf_tui::events::TuiEvent;
use shelf_tui::keys::map_key;
use shelf_tui::persistence::{self, PersistedState};
use shelf_tui::state::App;
use shelf_tui::views::render_view;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = ShelfConfig::load()?;
    shelf_tui::logging::init(&config.log_path)?;
    info!(backend = ?config.store.backend, "Starting shelf");

    let store = build_store(&config)?;
    let mut app = App::new(store, config.categories.catalog());
    match persistence::load(&config.persistence_path) {
        Ok(Some(state)) => app.view_mode = state.view_mode,
        Ok(None) => {}
        Err(err) => warn!(error = %err, "Ignoring unreadable UI state"),
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<TuiEvent>();
    spawn_input_reader(event_tx.clone());
    // A failed subscribe is already surfaced as a notification.
    let _ = app.activate(event_tx.clone()).await;

    let tick_rate = Duration::from_millis(config.tick_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    let result = loop {
        if let Err(err) = terminal.draw(|f| render_view(f, &app)) {
            break Err(TuiError::from(err));
        }

        tokio::select! {
            _ = ticker.tick() => {}
            Some(event) = event_rx.recv() => {
                handle_event(&mut app, event, &event_tx);
                if app.should_quit {
                    break Ok(());
                }
            }
        }
    };

    app.teardown();
    let persisted = PersistedState {
        view_mode: app.view_mode,
    };
    if let Err(err) = persistence::save(&config.persistence_path, &persisted) {
        warn!(error = %err, "Failed to save UI state");
    }
    info!("Shelf stopped");

    result
}

fn build_store(config: &ShelfConfig) -> Result<Arc<dyn NoteStore>, TuiError> {
    let store: Arc<dyn NoteStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(NoteStoreClient::new(InMemoryDocumentStore::new())),
        StoreBackend::Remote => {
            let settings = config
                .remote_settings()
                .ok_or(ConfigError::InvalidValue {
                    field: "store.remote",
                    reason: "missing".to_string(),
                })?;
            Arc::new(NoteStoreClient::new(RemoteDocumentStore::new(&settings)?))
        }
    };
    Ok(store)
}

fn handle_event(app: &mut App, event: TuiEvent, sender: &mpsc::UnboundedSender<TuiEvent>) {
    match event {
        TuiEvent::Input(key) => {
            if let Some(action) = map_key(key, app.input_mode()) {
                if let Some(effect) = app.dispatch(action, SystemClock.now()) {
                    spawn_effect(app.store(), effect, sender.clone());
                }
            }
        }
        TuiEvent::Snapshot(notes) => app.apply_snapshot(notes),
        TuiEvent::WriteFinished(outcome) => app.apply_outcome(outcome),
        TuiEvent::Resize { .. } => {}
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::UnboundedSender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let event = match evt {
                    CrosstermEvent::Key(key) => TuiEvent::Input(key),
                    CrosstermEvent::Resize(width, height) => TuiEvent::Resize { width, height },
                    _ => continue,
                };
                if sender.send(event).is_err() {
                    break;
                }
            }
        }
    });
}
