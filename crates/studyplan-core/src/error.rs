//! Core error types for studyplan-core.
//!
//! This module defines the error hierarchy using thiserror. Scheduling
//! requests fail fast on [`ValidationError`]; session input errors
//! ([`InvalidAction`]) and log sink failures ([`LogSinkError`]) are
//! recoverable and never abort a running session.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Log sink errors
    #[error("Log sink error: {0}")]
    LogSink(#[from] LogSinkError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A task cannot enter the chunker
    #[error("Invalid task '{task_id}': {message}")]
    InvalidTask { task_id: String, message: String },

    /// Unknown task type label
    #[error("Unknown task type: '{0}'")]
    UnknownTaskType(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn invalid_task(task_id: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidTask {
            task_id: task_id.to_string(),
            message: message.into(),
        }
    }
}

/// Rejected user input during a session. Always answered with a re-prompt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    /// Input is not one of the four action tokens
    #[error("Invalid input '{0}'. Please enter c, s, d, or e.")]
    UnknownToken(String),

    /// Extend amount is negative or not a number
    #[error("Invalid extend amount '{0}'. Please enter a non-negative number of minutes.")]
    InvalidExtendAmount(String),

    /// Breaks can only be completed or skipped
    #[error("Breaks cannot be {0}; complete or skip them instead.")]
    NotAllowedOnBreak(&'static str),

    /// Every item has already been completed or skipped
    #[error("The session is complete; there is no current item.")]
    SessionFinished,
}

/// Log sink errors. Non-fatal inside a session.
#[derive(Error, Debug)]
pub enum LogSinkError {
    /// Writing the log file failed
    #[error("Failed to write log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing log content could not be read back or encoded
    #[error("Log encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Database insert failed
    #[error("Log database error: {0}")]
    Database(#[from] DatabaseError),

    /// The sink refused the event
    #[error("Log sink rejected event: {0}")]
    Rejected(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Data directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for LogSinkError {
    fn from(err: rusqlite::Error) -> Self {
        LogSinkError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
