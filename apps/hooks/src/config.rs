//! # Hooks Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Config file (`hooks.toml`)
//! 3. Defaults (this file)
//!
//! ## Example `hooks.toml`
//! ```toml
//! database_path = "/var/lib/till/till.db"
//! max_connections = 5
//! naming_series = "ACC-SINV-.YYYY.-"
//! log_filter = "info,till=debug"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use till_db::{DbConfig, DEFAULT_NAMING_SERIES};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "hooks.toml";

/// Database file name inside the platform data directory.
pub const DATABASE_FILE_NAME: &str = "till.db";

/// Hooks configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// SQLite file. `None` means `<data dir>/till.db`.
    pub database_path: Option<PathBuf>,

    /// Maximum pool connections.
    /// Default: 5
    pub max_connections: u32,

    /// Naming series template for new invoices.
    /// Default: "ACC-SINV-.YYYY.-"
    pub naming_series: String,

    /// tracing filter directive; `RUST_LOG` still wins when set.
    pub log_filter: Option<String>,
}

impl Default for HooksConfig {
    fn default() -> Self {
        HooksConfig {
            database_path: None,
            max_connections: 5,
            naming_series: DEFAULT_NAMING_SERIES.to_string(),
            log_filter: None,
        }
    }
}

impl HooksConfig {
    /// Loads defaults, then the platform config file if present, then the
    /// process environment, and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => HooksConfig::from_file(&path)?,
            _ => HooksConfig::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        HooksConfig::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overrides fields from environment variables.
    ///
    /// ## Environment Variables
    /// - `TILL_DB_PATH`: database file
    /// - `TILL_DB_MAX_CONNECTIONS`: pool size
    /// - `TILL_NAMING_SERIES`: invoice naming series
    /// - `TILL_LOG`: tracing filter
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TILL_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(max) = lookup("TILL_DB_MAX_CONNECTIONS") {
            self.max_connections = max
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("TILL_DB_MAX_CONNECTIONS", &max))?;
        }

        if let Some(series) = lookup("TILL_NAMING_SERIES") {
            self.naming_series = series;
        }

        if let Some(filter) = lookup("TILL_LOG") {
            self.log_filter = Some(filter);
        }

        Ok(())
    }

    /// Checks values that would only fail later, deep inside a hook call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::invalid("max_connections", "0"));
        }

        if self.naming_series.trim().is_empty() {
            return Err(ConfigError::invalid("naming_series", &self.naming_series));
        }

        Ok(())
    }

    /// Returns the configured database path or the platform default.
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DATABASE_FILE_NAME))
    }

    /// Builds the pool configuration.
    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        Ok(DbConfig::new(self.resolve_database_path()?).max_connections(self.max_connections))
    }
}

/// `<config dir>/hooks.toml` for this platform, if one can be determined.
///
/// - **macOS**: `~/Library/Application Support/com.till.pos/hooks.toml`
/// - **Linux**: `~/.config/pos/hooks.toml`
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "till", "pos")
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Could not determine app data directory")]
    NoDataDir,
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
