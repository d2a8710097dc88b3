mod config;
pub mod database;
pub mod log_file;

pub use config::{BreakSettings, Config, PrioritySettings};
pub use database::{SqliteLogSink, StoredLogEvent};
pub use log_file::JsonFileLogSink;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/studyplan[-dev]/` based on STUDYPLAN_ENV.
///
/// Set STUDYPLAN_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studyplan-dev")
    } else {
        base_dir.join("studyplan")
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Default location of the JSON session log.
///
/// # Errors
/// Returns an error if the data directory cannot be created.
pub fn default_log_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("scheduler_log.json"))
}
