//! # Application Configuration
//!
//! Settings are read from a single YAML file. Every key is optional.
//!
//! ```yaml
//! data_directory: "/var/lib/ams"
//! users_file: "users.txt"
//! accommodations_file: "accommodations.txt"
//! restaurants_file: "restaurants.txt"
//! delimiter: ","
//! password_reset_storage: plaintext   # or: hashed
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::credentials::PasswordResetStorage;

/// Environment variable naming the config file read by the binary
pub const CONFIG_PATH_ENV: &str = "AMS_CONFIG";
/// Config file used when `AMS_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "ams.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("delimiter must be a single ASCII character other than a quote or line break, got {0:?}")]
    InvalidDelimiter(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the store files (None = platform default)
    pub data_directory: Option<PathBuf>,
    pub users_file: String,
    pub accommodations_file: String,
    pub restaurants_file: String,
    /// Field delimiter shared by all store files
    pub delimiter: String,
    /// How a reset password is written to the users file
    pub password_reset_storage: PasswordResetStorage,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: None,
            users_file: "users.txt".to_string(),
            accommodations_file: "accommodations.txt".to_string(),
            restaurants_file: "restaurants.txt".to_string(),
            delimiter: ",".to_string(),
            password_reset_storage: PasswordResetStorage::default(),
        }
    }
}

impl AppConfig {
    /// Load the config at `path`; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let yaml_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&yaml_content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.delimiter_byte()?;

        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Load the config named by `AMS_CONFIG`, or `ams.yaml`
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// The delimiter as the single byte the codec expects
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() && !matches!(byte, b'"' | b'\n' | b'\r') => Ok(*byte),
            _ => Err(ConfigError::InvalidDelimiter(self.delimiter.clone())),
        }
    }
}
