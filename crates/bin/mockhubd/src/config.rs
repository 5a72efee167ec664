//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `mockhub.toml` in the working directory, or at the path in
//! `MOCKHUB_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::{Path, PathBuf};

use mockhub_adapter_virtual::VirtualConfig;
use serde::Deserialize;

const DEFAULT_PATH: &str = "mockhub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
    /// Event bus settings.
    pub events: EventsConfig,
    /// Devices of the virtual integration.
    #[serde(rename = "virtual")]
    pub virtual_devices: VirtualConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Build the devices listed under `[virtual]`.
    pub virtual_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Capacity of the broadcast channel. Slow readers lose the oldest events.
    pub capacity: usize,
}

impl Config {
    /// Path of the configuration file: `MOCKHUB_CONFIG` or `mockhub.toml`.
    #[must_use]
    pub fn path() -> PathBuf {
        std::env::var_os("MOCKHUB_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_PATH), PathBuf::from)
    }

    /// Load configuration from [`Config::path`] (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result does not validate.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    /// Same as [`Config::load`] with an explicit file path.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MOCKHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("MOCKHUB_VIRTUAL_ENABLED")
            && let Ok(enabled) = val.parse()
        {
            self.integrations.virtual_enabled = enabled;
        }
        if let Some(val) = var("MOCKHUB_EVENTS_CAPACITY")
            && let Ok(capacity) = val.parse()
        {
            self.events.capacity = capacity;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.events.capacity == 0 {
            return Err(ConfigError::Validation(
                "events.capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Devices to build, honouring the integration toggle.
    #[must_use]
    pub fn virtual_config(&self) -> VirtualConfig {
        if self.integrations.virtual_enabled {
            self.virtual_devices.clone()
        } else {
            VirtualConfig::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "mockhubd=info,mockhub_app=info,mockhub_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
