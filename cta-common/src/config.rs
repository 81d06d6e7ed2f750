//! Configuration loading for the CTA client
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--config`, `--server`)
//! 2. Environment variables (`CTA_CONFIG`, `CTA_SERVER_URL`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error: the client warns and runs on
//! defaults. A file that exists but cannot be read or parsed is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::types::LayoutChoice;
use crate::{Error, Result};

/// Environment variable naming the TOML file
pub const CONFIG_PATH_ENV: &str = "CTA_CONFIG";

/// Environment variable overriding `server_url`
pub const SERVER_URL_ENV: &str = "CTA_SERVER_URL";

/// Client configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Analysis server origin, e.g. `http://127.0.0.1:5000`
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Layout used when none is chosen explicitly
    #[serde(default)]
    pub default_layout: LayoutChoice,

    /// Upload retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Status event channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upload retry settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Attempts per upload, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Deadline for a single attempt
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Pause between a failed attempt and the next one
    #[serde(default)]
    pub retry_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_event_capacity() -> usize {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_attempt_timeout_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            default_layout: LayoutChoice::default(),
            retry: RetryConfig::default(),
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            retry_delay_ms: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl RetryConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub server_url: Option<String>,
}

impl ClientConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config = Self::from_toml_str(&toml_str)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Resolve the complete configuration
    ///
    /// Applies the priority order in the module docs. `server_url` from CLI
    /// or environment replaces the TOML value.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match resolve_config_path(overrides.config_path.as_deref()) {
            Some(path) if path.exists() => Self::load(&path)?,
            Some(path) => {
                warn!(
                    "Config file {:?} not found, using built-in defaults",
                    path
                );
                Self::default()
            }
            None => {
                warn!("No config directory available, using built-in defaults");
                Self::default()
            }
        };

        if let Some(url) = overrides.server_url {
            info!("Server URL: {} (from CLI override)", url);
            config.server_url = url;
        } else if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                info!("Server URL: {} (from {})", url, SERVER_URL_ENV);
                config.server_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        let url = self.server_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "server_url must start with http:// or https://, got {:?}",
                self.server_url
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".to_string()));
        }
        if self.retry.attempt_timeout_ms == 0 {
            return Err(Error::Config("retry.attempt_timeout_ms must be positive".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be positive".to_string()));
        }
        Ok(())
    }

    /// Server origin without a trailing slash
    pub fn server_origin(&self) -> &str {
        self.server_url.trim().trim_end_matches('/')
    }
}

/// Pick the TOML path: CLI argument, then `CTA_CONFIG`, then the
/// platform config directory (`~/.config/cta/cta-client.toml` on Linux)
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Platform default TOML location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cta").join("cta-client.toml"))
}
