//! Configuration management for errortodos.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "errortodos";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "tracker.db";

/// Largest accepted image attachment, in bytes.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ERRORTODOS_`)
/// 2. TOML config file at `~/.config/errortodos/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Account configuration.
    pub accounts: AccountsConfig,
    /// Session configuration.
    pub session: SessionConfig,
    /// Error record configuration.
    pub records: RecordsConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/errortodos/tracker.db`
    pub database_path: Option<PathBuf>,
}

/// Account-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Minimum password length accepted at sign-up.
    pub min_password_length: usize,
}

/// Session-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minutes of inactivity after which a stored session is discarded.
    /// Set to 0 to trust stored sessions indefinitely.
    pub max_idle_minutes: u32,
}

/// Error record configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Category assigned when none is given at creation.
    pub default_category: String,
    /// Maximum size of an image attachment in bytes.
    pub max_image_bytes: u64,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            default_category: "general".to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ERRORTODOS_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.accounts.min_password_length == 0 {
            return Err(Error::ConfigValidation {
                message: "min_password_length must be greater than 0".to_string(),
            });
        }

        if self.records.default_category.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "default_category cannot be blank".to_string(),
            });
        }

        if self.records.max_image_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "max_image_bytes must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the session idle limit, if stored sessions expire at all.
    #[must_use]
    pub fn max_idle(&self) -> Option<Duration> {
        if self.session.max_idle_minutes == 0 {
            None
        } else {
            Some(Duration::minutes(i64::from(self.session.max_idle_minutes)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.accounts.min_password_length, 6);
        assert_eq!(config.session.max_idle_minutes, 0);
        assert_eq!(config.records.default_category, "general");
        assert_eq!(config.records.max_image_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_password_length() {
        let mut config = Config::default();
        config.accounts.min_password_length = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("min_password_length"));
    }

    #[test]
    fn test_validate_blank_category() {
        let mut config = Config::default();
        config.records.default_category = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_category"));
    }

    #[test]
    fn test_validate_zero_image_limit() {
        let mut config = Config::default();
        config.records.max_image_bytes = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_image_bytes"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("tracker.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_max_idle_none_when_zero() {
        assert!(Config::default().max_idle().is_none());
    }

    #[test]
    fn test_max_idle_some_when_set() {
        let mut config = Config::default();
        config.session.max_idle_minutes = 30;

        assert_eq!(config.max_idle(), Some(Duration::minutes(30)));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("errortodos"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[accounts]\nmin_password_length = 10\n\n[records]\ndefault_category = \"misc\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.accounts.min_password_length, 10);
        assert_eq!(config.records.default_category, "misc");
        assert_eq!(config.records.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
    }

    #[test]
    fn test_records_config_deserialize() {
        let json = r#"{"default_category": "api"}"#;
        let records: RecordsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(records.default_category, "api");
        assert_eq!(records.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
    }
}
