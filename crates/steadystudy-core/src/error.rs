//! Core error types for steadystudy-core.
//!
//! Scheduling itself only fails on malformed input ([`ValidationError`]).
//! Tasks that cannot be fitted are reported as outcomes, never as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for steadystudy-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed input handed to the finder, scheduler or planner
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home or data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Invalid input. Fatal to the single call; the caller must fix the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end_time ({end}) must be greater than start_time ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Task duration must be strictly positive
    #[error("Invalid duration for task '{task_id}': {minutes} minutes (must be > 0)")]
    InvalidDuration { task_id: String, minutes: i64 },

    /// Day window with start >= end or out of the 24h range
    #[error("Invalid day window {start}-{end}: start must be before end within 00:00-24:00")]
    InvalidDayWindow { start: String, end: String },

    /// Unparseable "HH:MM" text
    #[error("Invalid time of day '{0}': expected HH:MM")]
    InvalidTimeOfDay(String),

    /// Two free blocks share wall-clock time
    #[error("Free blocks overlap: {first_start}-{first_end} and {second_start}-{second_end}")]
    OverlappingFreeBlocks {
        first_start: chrono::DateTime<chrono::Utc>,
        first_end: chrono::DateTime<chrono::Utc>,
        second_start: chrono::DateTime<chrono::Utc>,
        second_end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
