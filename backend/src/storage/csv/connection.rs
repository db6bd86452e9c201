use anyhow::Result;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "AMS_DATA_DIR";

/// FileConnection resolves the data directory and the backing file of each store
#[derive(Debug, Clone)]
pub struct FileConnection {
    base_directory: PathBuf,
    users_file: String,
    accommodations_file: String,
    restaurants_file: String,
    delimiter: u8,
}

impl FileConnection {
    /// Create a new connection rooted at `base_directory` with default file names
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        Self::with_config(base_directory, &AppConfig::default())
    }

    /// Create a new connection rooted at `base_directory` using the file names
    /// and delimiter from `config`
    pub fn with_config<P: AsRef<Path>>(base_directory: P, config: &AppConfig) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            users_file: config.users_file.clone(),
            accommodations_file: config.accommodations_file.clone(),
            restaurants_file: config.restaurants_file.clone(),
            delimiter: config.delimiter_byte()?,
        })
    }

    /// Create a connection for `config`, falling back to the default data
    /// directory when the config does not name one
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let base = match &config.data_directory {
            Some(dir) => dir.clone(),
            None => Self::default_data_directory(),
        };
        Self::with_config(base, config)
    }

    /// Create a new connection in the default data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_data_directory())
    }

    /// `$AMS_DATA_DIR`, else the platform data directory, else `./data`
    pub fn default_data_directory() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                info!("Using data directory from {}: {}", DATA_DIR_ENV, trimmed);
                return PathBuf::from(trimmed);
            }
            warn!("{} is set but empty, ignoring it", DATA_DIR_ENV);
        }

        match dirs::data_dir() {
            Some(dir) => dir.join("ams"),
            None => {
                warn!("Could not determine platform data directory, using ./data");
                PathBuf::from("data")
            }
        }
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn users_path(&self) -> PathBuf {
        self.base_directory.join(&self.users_file)
    }

    pub fn accommodations_path(&self) -> PathBuf {
        self.base_directory.join(&self.accommodations_file)
    }

    pub fn restaurants_path(&self) -> PathBuf {
        self.base_directory.join(&self.restaurants_file)
    }
}
