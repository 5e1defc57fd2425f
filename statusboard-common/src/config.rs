//! Bootstrap configuration loading
//!
//! Config file location follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `STATUSBOARD_CONFIG` environment variable
//! 3. `~/.config/statusboard/config.toml` (platform config dir)
//! 4. Built-in defaults (fallback)
//!
//! A missing file never stops startup: a warning is logged and defaults
//! are used. A file that exists but does not parse is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "STATUSBOARD_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the backend serving `/api/data.json` and `/api/tags.json`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP port of the dashboard service
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between automatic update checks; 0 disables them
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Per-request timeout for backend fetches
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            port: default_port(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Interval for the auto-refresh task, `None` when disabled
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Per-user default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("statusboard").join("config.toml"))
}

/// Pick the config file to read, by priority. `None` means use defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory, only if present
    default_config_path().filter(|p| p.exists())
}

/// Load configuration following the resolution order above
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg) else {
        info!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file {} not found, using built-in defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let config = TomlConfig::from_file(&path)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}
