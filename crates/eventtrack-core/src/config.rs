//! Configuration loading and typed config structures for the event tracking
//! service.
//!
//! The canonical configuration lives in `eventtrack-config.yaml` in the
//! working directory. This module defines strongly-typed structs that mirror
//! the YAML structure and provides a loader that reads and validates the
//! file. Every field has a default, so an absent file or an absent section
//! falls back to the stock 60-second window and the standard field bounds.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds values the service cannot run with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `eventtrack-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Trailing window settings.
    #[serde(default)]
    pub window: WindowConfig,

    /// Field bounds applied by the validator.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `EVENTTRACK_HOST` overrides `server.host`
    /// - `EVENTTRACK_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.server.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// No environment overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the window is empty or the `y`
    /// bounds are inverted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "window.duration_ms must be greater than zero".to_owned(),
            ));
        }
        if self.validation.y_min > self.validation.y_max {
            return Err(ConfigError::Invalid(format!(
                "validation.y_min ({}) must not exceed validation.y_max ({})",
                self.validation.y_min, self.validation.y_max
            )));
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// Override listener settings with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `EVENTTRACK_PORT` is not a port
    /// number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("EVENTTRACK_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("EVENTTRACK_PORT") {
            self.port = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid EVENTTRACK_PORT: {e}")))?;
        }
        Ok(())
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Trailing window configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WindowConfig {
    /// Length of the trailing window in milliseconds.
    #[serde(default = "default_window_duration_ms")]
    pub duration_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_window_duration_ms(),
        }
    }
}

/// Field bounds enforced on accepted events.
///
/// `x` is always bounded to `[0, 1]`; only its precision is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ValidationConfig {
    /// Smallest accepted `y` (inclusive).
    #[serde(default = "default_y_min")]
    pub y_min: i32,

    /// Largest accepted `y` (inclusive).
    #[serde(default = "default_y_max")]
    pub y_max: i32,

    /// Maximum number of fractional digits allowed in `x`.
    #[serde(default = "default_x_max_fraction_digits")]
    pub x_max_fraction_digits: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            y_min: default_y_min(),
            y_max: default_y_max(),
            x_max_fraction_digits: default_x_max_fraction_digits(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one event per line.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_window_duration_ms() -> u64 {
    60_000
}

const fn default_y_min() -> i32 {
    1_073_741_823
}

const fn default_y_max() -> i32 {
    i32::MAX
}

const fn default_x_max_fraction_digits() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}
