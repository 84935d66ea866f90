//! Configuration for the preference store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the preference store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base directory for preference files
    pub data_dir: PathBuf,

    /// File name within `data_dir`
    pub file_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data"), file_name: "preferences.json".to_string() }
    }
}

impl StoreConfig {
    /// Create a new configuration with the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Self::default() }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("COVER_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    /// Full path of the preferences file
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}
