use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use proptest::prelude::*;
use ratatui::style::Color;
use shelf_core::{CategoryCatalog, CategorySource, CountPolicy};
use shelf_tui::config::{ConfigError, ShelfConfig, StoreBackend};
use shelf_tui::keys::{map_key, Action, InputMode};
use shelf_tui::nav::ViewMode;
use shelf_tui::theme::{card_border_color, token_color, ShelfTheme};

const EXAMPLE: &str = include_str!("../shelf.example.toml");

fn base_config() -> ShelfConfig {
    ShelfConfig::from_toml(EXAMPLE).unwrap()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

#[test]
fn example_config_is_valid_and_canonical() {
    let config = base_config();
    config.validate().unwrap();
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.categories.catalog(), CategoryCatalog::canonical());
}

#[test]
fn config_rejects_unknown_fields() {
    let toml = EXAMPLE.replace("[store]", "retry = true\n\n[store]");
    assert!(matches!(
        ShelfConfig::from_toml(&toml),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn config_requires_remote_section_for_remote_backend() {
    let mut config = base_config();
    config.store.backend = StoreBackend::Remote;
    config.store.remote = None;
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_remote_auth() {
    let toml = EXAMPLE.replace(
        "backend = \"memory\"",
        "backend = \"remote\"\n\n[store.remote]\nbase_url = \"http://localhost:8080\"\nws_endpoint = \"ws://localhost:8080\"\nrequest_timeout_ms = 5000\n\n[store.remote.auth]\n",
    );
    let config = ShelfConfig::from_toml(&toml).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue {
            field: "store.remote.auth",
            ..
        })
    ));
}

#[test]
fn remote_settings_carry_timeout_and_auth() {
    let toml = EXAMPLE.replace(
        "backend = \"memory\"",
        "backend = \"remote\"\n\n[store.remote]\nbase_url = \"http://localhost:8080\"\nws_endpoint = \"ws://localhost:8080\"\nrequest_timeout_ms = 1500\n\n[store.remote.auth]\nbearer_token = \"jwt\"\n",
    );
    let config = ShelfConfig::from_toml(&toml).unwrap();
    config.validate().unwrap();
    let settings = config.remote_settings().unwrap();
    assert_eq!(settings.request_timeout.as_millis(), 1500);
    assert_eq!(settings.bearer_token.as_deref(), Some("jwt"));
    assert!(settings.api_key.is_none());
}

#[test]
fn config_rejects_duplicate_seed_names() {
    let mut config = base_config();
    let first = config.categories.seed[0].clone();
    config.categories.seed.push(first);
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_zero_tick() {
    let mut config = base_config();
    config.tick_interval_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn user_built_catalog_starts_empty_even_with_seed() {
    let mut config = base_config();
    config.categories.source = CategorySource::UserBuilt;
    config.categories.count_policy = CountPolicy::Derived;
    config.validate().unwrap();
    let catalog = config.categories.catalog();
    assert!(catalog.is_empty());
    assert_eq!(catalog.count_policy(), CountPolicy::Derived);
}

#[test]
fn form_keys_type_characters_that_browse_binds() {
    assert_eq!(
        map_key(key(KeyCode::Char('q')), InputMode::Browse),
        Some(Action::Quit)
    );
    assert_eq!(
        map_key(key(KeyCode::Char('q')), InputMode::Form),
        Some(Action::Input('q'))
    );
}

#[test]
fn ctrl_c_quits_in_every_mode() {
    let mut event = key(KeyCode::Char('c'));
    event.modifiers = KeyModifiers::CONTROL;
    assert_eq!(map_key(event, InputMode::Browse), Some(Action::Quit));
    assert_eq!(map_key(event, InputMode::Form), Some(Action::Quit));
}

#[test]
fn key_release_is_ignored() {
    let mut event = key(KeyCode::Char('n'));
    event.kind = KeyEventKind::Release;
    assert_eq!(map_key(event, InputMode::Browse), None);
}

#[test]
fn view_mode_columns() {
    assert_eq!(ViewMode::List.columns(), 1);
    assert_eq!(ViewMode::Grid.columns(), 3);
}

fn arb_family() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("gray"),
        Just("red"),
        Just("amber"),
        Just("green"),
        Just("blue"),
        Just("purple"),
        Just("pink"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_token_prefix_and_shade_do_not_matter(
        family in arb_family(),
        shade in prop_oneof![Just(50u16), Just(100), Just(500), Just(800)],
    ) {
        let bg = token_color(&format!("bg-{}-{}", family, shade));
        let border = token_color(&format!("border-l-4 border-l-{}-{}", family, shade));
        prop_assert!(bg.is_some());
        prop_assert_eq!(bg, border);
    }

    #[test]
    fn prop_card_border_never_panics(token in ".{0,40}") {
        let theme = ShelfTheme::paper();
        let color = card_border_color(&token, &theme);
        prop_assert!(matches!(color, Color::Rgb(..)));
    }

    #[test]
    fn prop_map_key_never_panics(c in any::<char>(), form in any::<bool>()) {
        let mode = if form { InputMode::Form } else { InputMode::Browse };
        let _ = map_key(key(KeyCode::Char(c)), mode);
    }

    #[test]
    fn prop_view_mode_toggle_is_involution(grid in any::<bool>()) {
        let mode = if grid { ViewMode::Grid } else { ViewMode::List };
        prop_assert_eq!(mode.toggle().toggle(), mode);
    }
}
