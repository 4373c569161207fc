//! Configuration loading and typed config structures for Turnero.
//!
//! The configuration lives in `turnero-config.yaml` next to the binary's
//! working directory. Every field has a default, so an absent file or a
//! partial file is fine. A handful of environment variables override the
//! YAML values for container deployments.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;

use crate::clock::CivilCalendar;

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

    /// The calendar zone is not an IANA time zone name.
    #[error("unknown time zone: {0}")]
    UnknownTimezone(String),

    /// A value is out of its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TurneroConfig {
    /// Network and static asset settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Civil calendar used for the daily stats rollover.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TurneroConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides and validate.
    ///
    /// Environment variables override YAML values:
    /// - `TURNERO_HOST` overrides `server.host`
    /// - `TURNERO_PORT` overrides `server.port`
    /// - `TURNERO_STATIC_DIR` overrides `server.static_dir`
    /// - `TURNERO_TIMEZONE` overrides `calendar.timezone`
    /// - `TURNERO_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for when no file exists.
    ///
    /// # Errors
    ///
    /// Returns a validation error if an override is unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// A port that does not parse is ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("TURNERO_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("TURNERO_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("TURNERO_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("TURNERO_TIMEZONE") {
            self.calendar.timezone = val;
        }
        if let Some(val) = lookup("TURNERO_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Check ranges and names that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTimezone`] or [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calendar.civil_calendar()?;
        if self.server.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid {
                reason: "server.broadcast_capacity must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Network and static asset configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for HTTP and `WebSocket` traffic.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of client UI assets served at `/`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Snapshots buffered per observer before a slow one starts skipping.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Civil calendar configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarConfig {
    /// IANA zone whose midnight resets the served counter.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl CalendarConfig {
    /// Resolve the configured zone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTimezone`] if the name is not in the
    /// IANA database.
    pub fn civil_calendar(&self) -> Result<CivilCalendar, ConfigError> {
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_parse| ConfigError::UnknownTimezone(self.timezone.clone()))?;
        Ok(CivilCalendar::new(tz))
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error, or directives).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
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
    8081
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

const fn default_broadcast_capacity() -> usize {
    256
}

fn default_timezone() -> String {
    "America/Argentina/Buenos_Aires".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}
