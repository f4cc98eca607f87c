//! Bootstrap configuration
//!
//! A small TOML file holds everything needed before the service starts:
//! where the record file and backups live, who the operators are, and what
//! address the update endpoint listens on.
//!
//! Config file resolution, highest priority first:
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`REFDESK_CONFIG`)
//! 3. User config directory (`~/.config/refdesk/config.toml` on Linux)
//! 4. System-wide `/etc/refdesk/config.toml` (Unix only)
//!
//! A missing file is not fatal: built-in defaults are used and a warning is
//! logged. A file that exists but does not parse is a startup error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::operators::UserId;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "REFDESK_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Record file (JSON array of records)
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Directory receiving `/backup` snapshots
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Operator user ids allowed to run admin commands
    #[serde(default)]
    pub operators: Vec<i64>,

    /// HTTP port for the update endpoint
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address for the update endpoint
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Shared token the transport must present (disabled when absent)
    #[serde(default)]
    pub api_token: Option<String>,

    /// Logging configuration (optional)
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

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            backup_dir: default_backup_dir(),
            operators: Vec::new(),
            port: default_port(),
            bind_address: default_bind_address(),
            api_token: None,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("schedule_data.json")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_port() -> u16 {
    5780
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Configured operators as typed ids
    pub fn operator_ids(&self) -> Vec<UserId> {
        self.operators.iter().copied().map(UserId).collect()
    }

    /// Blank tokens count as "no token"
    pub fn effective_api_token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Pick the config file to read, following the priority order above
///
/// Returns `None` when no candidate exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config directory
    if let Some(path) = dirs::config_dir().map(|d| d.join("refdesk").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    // Priority 4: System-wide config
    if cfg!(unix) {
        let system = PathBuf::from("/etc/refdesk/config.toml");
        if system.exists() {
            return Some(system);
        }
    }

    None
}

/// Resolve and load the config, falling back to defaults when missing
///
/// Returns the config together with the path it was read from (if any).
pub fn load_or_default(cli_arg: Option<&Path>) -> Result<(TomlConfig, Option<PathBuf>)> {
    match resolve_config_path(cli_arg) {
        Some(path) if path.exists() => {
            let config = TomlConfig::load(&path)?;
            info!("Loaded configuration from {}", path.display());
            Ok((config, Some(path)))
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            Ok((TomlConfig::default(), None))
        }
        None => {
            warn!("No config file found, using built-in defaults");
            Ok((TomlConfig::default(), None))
        }
    }
}
