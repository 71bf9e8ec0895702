use crate::error::AppError;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_default_snapshot_path, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// URL of the community data pack holding the name tables.
    #[serde(default = "default_data_pack_url")]
    pub data_pack_url: String,
    /// Path of the persisted mapping snapshot. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<String>,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for data pack downloads. Defaults to 30 seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Fixed UTC offset, in hours, of the weekly refresh and of rendered dates.
    #[serde(default = "default_utc_offset")]
    pub schedule_utc_offset_hours: i32,
}

fn default_data_pack_url() -> String {
    crate::constants::DEFAULT_DATA_PACK_URL.to_string()
}

/// Default HTTP timeout in seconds
fn default_http_timeout() -> u64 {
    crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_utc_offset() -> i32 {
    crate::constants::refresh::DEFAULT_UTC_OFFSET_HOURS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_pack_url: default_data_pack_url(),
            snapshot_path: None,
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
            schedule_utc_offset_hours: default_utc_offset(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// If no config file exists, the defaults are written there.
    /// Environment variables can override config file values.
    ///
    /// # Environment Variables
    /// - `SV_DATA_PACK_URL` - Override data pack URL
    /// - `SV_SNAPSHOT_PATH` - Override snapshot path
    /// - `SV_LOG_FILE` - Override log file path
    /// - `SV_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    pub async fn load() -> Result<Self, AppError> {
        Self::load_or_create(&get_config_path()).await
    }

    /// Loads `path`, creating it with defaults when missing, then applies the
    /// environment overrides and validates the result.
    pub async fn load_or_create(path: &str) -> Result<Self, AppError> {
        let mut config = if Path::new(path).exists() {
            Self::load_from_path(path).await?
        } else {
            let config = Config::default();
            match config.save_to_path(path).await {
                Ok(()) => info!("Created default configuration at {path}"),
                Err(e) => warn!("Could not write default configuration to {path}: {e}"),
            }
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SV_DATA_PACK_URL") {
            self.data_pack_url = url;
        }

        if let Ok(snapshot_path) = std::env::var("SV_SNAPSHOT_PATH") {
            self.snapshot_path = Some(snapshot_path);
        }

        if let Ok(log_file_path) = std::env::var("SV_LOG_FILE") {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var("SV_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Snapshot location, falling back to the platform data directory
    pub fn resolved_snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(get_default_snapshot_path)
    }

    /// The fixed offset the weekly refresh and rendered dates use
    pub fn schedule_offset(&self) -> Result<FixedOffset, AppError> {
        self.schedule_utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::config_error(format!(
                    "Invalid schedule UTC offset {}",
                    self.schedule_utc_offset_hours
                ))
            })
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays current configuration settings to stdout.
    ///
    /// # Notes
    /// - Shows config file location and current settings
    /// - Handles case when no config file exists
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let log_dir = get_log_dir_path();

        if Path::new(&config_path).exists() {
            let config = Config::load().await?;
            println!("\nCurrent Configuration");
            println!("────────────────────────────────────");
            println!("Config Location:");
            println!("{config_path}");
            println!("────────────────────────────────────");
            println!("Data Pack URL:");
            println!("{}", config.data_pack_url);
            println!("────────────────────────────────────");
            println!("Snapshot Location:");
            println!("{}", config.resolved_snapshot_path().display());
            if config.snapshot_path.is_none() {
                println!("(Default location)");
            }
            println!("────────────────────────────────────");
            println!("HTTP Timeout:");
            println!("{} seconds", config.http_timeout_seconds);
            println!("────────────────────────────────────");
            println!("Weekly Refresh:");
            println!(
                "Sunday 03:00 (UTC{:+})",
                config.schedule_utc_offset_hours
            );
            println!("────────────────────────────────────");
            println!("Log File Location:");
            if let Some(custom_path) = &config.log_file_path {
                println!("{custom_path}");
            } else {
                println!("{log_dir}/{}", crate::constants::LOG_FILE_NAME);
                println!("(Default location)");
            }
        } else {
            println!("\nNo configuration file found at:");
            println!("{config_path}");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without environment overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
