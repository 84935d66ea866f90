//! CLI configuration management

use cover_engine::session::DEFAULT_WALLET;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::Cli;

/// Settings for one CLI run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Directory for stored preferences
    pub data_dir: PathBuf,

    /// Wallet for a player with no stored balance
    pub starting_wallet: i64,

    /// Engine configuration file, if any
    pub engine_config: Option<PathBuf>,

    /// Stadium used when none is given or stored
    pub default_stadium: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig { level: "info".to_string(), format: "compact".to_string() },
            data_dir: PathBuf::from("./data"),
            starting_wallet: DEFAULT_WALLET,
            engine_config: None,
            default_stadium: "mum".to_string(),
        }
    }
}

impl CliConfig {
    /// Defaults, then `COVER_` environment variables, then command line flags
    pub fn load(cli: &Cli) -> Self {
        let mut config = Self::default();
        config.apply_env();

        if let Some(level) = &cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(dir) = &cli.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(path) = &cli.config {
            config.engine_config = Some(path.clone());
        }
        config
    }

    fn apply_env(&mut self) {
        if let Ok(level) = std::env::var("COVER_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("COVER_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(data_dir) = std::env::var("COVER_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(wallet) = std::env::var("COVER_STARTING_WALLET") {
            self.starting_wallet = wallet.parse().unwrap_or(DEFAULT_WALLET);
        }

        if let Ok(path) = std::env::var("COVER_CONFIG") {
            self.engine_config = Some(PathBuf::from(path));
        }

        if let Ok(stadium) = std::env::var("COVER_DEFAULT_STADIUM") {
            self.default_stadium = stadium;
        }
    }
}
