//! Configuration loading for the shelf TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use shelf_core::{Category, CategoryCatalog, CategorySource, CountPolicy};
use shelf_store::RemoteStoreSettings;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShelfConfig {
    pub tick_interval_ms: u64,
    pub persistence_path: PathBuf,
    pub log_path: PathBuf,
    pub store: StoreConfig,
    pub categories: CategoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local store; notes vanish on exit.
    Memory,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    pub base_url: String,
    pub ws_endpoint: String,
    pub request_timeout_ms: u64,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub source: CategorySource,
    pub count_policy: CountPolicy,
    #[serde(default)]
    pub seed: Vec<Category>,
}

impl CategoryConfig {
    pub fn catalog(&self) -> CategoryCatalog {
        CategoryCatalog::new(self.source, self.count_policy, self.seed.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or SHELF_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ShelfConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be > 0"));
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(invalid("persistence_path", "must not be empty"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(invalid("log_path", "must not be empty"));
        }
        match (self.store.backend, &self.store.remote) {
            (StoreBackend::Remote, None) => {
                return Err(invalid(
                    "store.remote",
                    "required when store.backend = \"remote\"",
                ));
            }
            (StoreBackend::Remote, Some(remote)) => remote.validate()?,
            (StoreBackend::Memory, _) => {}
        }

        let mut seen = HashSet::new();
        for category in &self.categories.seed {
            if category.name.trim().is_empty() {
                return Err(invalid("categories.seed.name", "must not be empty"));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "categories.seed",
                    reason: format!("duplicate category name '{}'", category.name),
                });
            }
        }
        if self.categories.source == CategorySource::Seeded && self.categories.seed.is_empty() {
            return Err(invalid(
                "categories.seed",
                "source = \"seeded\" needs at least one seed entry",
            ));
        }
        Ok(())
    }

    /// Remote store settings, when the remote backend is configured.
    pub fn remote_settings(&self) -> Option<RemoteStoreSettings> {
        let remote = self.store.remote.as_ref()?;
        Some(RemoteStoreSettings {
            base_url: remote.base_url.clone(),
            ws_endpoint: remote.ws_endpoint.clone(),
            request_timeout: Duration::from_millis(remote.request_timeout_ms),
            api_key: remote.auth.api_key.clone(),
            bearer_token: remote.auth.bearer_token.clone(),
        })
    }
}

impl RemoteConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(invalid("store.remote.base_url", "must not be empty"));
        }
        if self.ws_endpoint.trim().is_empty() {
            return Err(invalid("store.remote.ws_endpoint", "must not be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("store.remote.request_timeout_ms", "must be > 0"));
        }
        if self.auth.api_key.is_none() && self.auth.bearer_token.is_none() {
            return Err(invalid(
                "store.remote.auth",
                "api_key or bearer_token must be provided",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("SHELF_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
