use super::Config;
use crate::error::AppError;
use std::path::Path;

/// Validates the configuration settings
///
/// # Validation Rules
/// - Data pack URL cannot be empty and must use http:// or https://
/// - Snapshot and log file paths, when provided, cannot be empty
/// - Log file path parent directory must exist or be creatable
/// - HTTP timeout must be at least one second
/// - Schedule UTC offset must lie within -12..=14 hours
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    let url = config.data_pack_url.trim();
    if url.is_empty() {
        return Err(AppError::config_error("Data pack URL cannot be empty"));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::config_error(
            "Data pack URL must start with http:// or https://",
        ));
    }

    if let Some(snapshot_path) = &config.snapshot_path
        && snapshot_path.trim().is_empty()
    {
        return Err(AppError::config_error("Snapshot path cannot be empty"));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        // Check if parent directory exists or can be created
        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "HTTP timeout must be at least 1 second",
        ));
    }

    if !(-12..=14).contains(&config.schedule_utc_offset_hours) {
        return Err(AppError::config_error(format!(
            "Schedule UTC offset {} is outside -12..=14 hours",
            config.schedule_utc_offset_hours
        )));
    }

    Ok(())
}
