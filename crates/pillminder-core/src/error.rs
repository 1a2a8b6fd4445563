//! Core error types for pillminder-core.
//!
//! This module defines the error hierarchy using thiserror. Nothing in
//! the alarm engine escalates to a fatal error: malformed schedule
//! entries are skipped, and persisted state is advisory.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pillminder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Schedule database errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Persisted alarm-state errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schedule entry validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Schedule-database errors.
#[derive(Error, Debug)]
pub enum StorageError {
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
}

/// Persisted alarm-state errors.
///
/// These are advisory: callers fall back to an empty state on read
/// failure and keep running on write failure.
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to read the state file
    #[error("Failed to read alarm state from {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    /// Failed to write the state file
    #[error("Failed to write alarm state to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// State file exists but does not parse
    #[error("Failed to parse alarm state: {0}")]
    ParseFailed(String),

    /// State file was written by a newer version of the layout
    #[error("Unsupported alarm state version: {0}")]
    UnsupportedVersion(u32),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value cannot be parsed for the key's type
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Schedule entry validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// An enabled reminder must have at least one time of day
    #[error("Reminder '{id}' is enabled but has no times")]
    EmptyTimes { id: String },

    /// Time-of-day entries must be HH:MM, 24-hour
    #[error("Invalid time-of-day '{value}': expected HH:MM")]
    InvalidTime { value: String },

    /// The active window must not be inverted
    #[error("Invalid date range: start_date ({start}) is after end_date ({end})")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
