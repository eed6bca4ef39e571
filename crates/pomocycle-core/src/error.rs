//! Core error types for pomocycle-core.
//!
//! The engine itself only ever fails with [`ValidationError`]; the storage
//! collaborators add database and configuration failures on top.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomocycle-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Stored row could not be decoded
    #[error("Corrupt session row: {0}")]
    CorruptRow(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// A timer setting that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    PomodoroDuration,
    ShortBreakDuration,
    LongBreakDuration,
    PomodorosUntilLongBreak,
    ActiveRecallDuration,
}

impl SettingsField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsField::PomodoroDuration => "pomodoro_duration_min",
            SettingsField::ShortBreakDuration => "short_break_duration_min",
            SettingsField::LongBreakDuration => "long_break_duration_min",
            SettingsField::PomodorosUntilLongBreak => "pomodoros_until_long_break",
            SettingsField::ActiveRecallDuration => "active_recall_duration_min",
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors.
///
/// Always recoverable: whatever state the caller had committed is untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more timer settings are out of range
    #[error("invalid timer settings: {}", join_fields(.fields))]
    InvalidSettings { fields: Vec<SettingsField> },

    /// Active-recall summary was empty after trimming
    #[error("active recall summary must not be empty")]
    EmptyRecallSummary,

    /// A recall summary was submitted outside the active-recall phase
    #[error("no active recall phase in progress")]
    NotInActiveRecall,
}

impl ValidationError {
    /// Fields rejected by settings validation, empty for other variants.
    pub fn fields(&self) -> &[SettingsField] {
        match self {
            ValidationError::InvalidSettings { fields } => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[SettingsField]) -> String {
    fields
        .iter()
        .map(SettingsField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_settings_message_lists_every_field() {
        let err = ValidationError::InvalidSettings {
            fields: vec![
                SettingsField::PomodoroDuration,
                SettingsField::PomodorosUntilLongBreak,
            ],
        };
        assert_eq!(
            err.to_string(),
            "invalid timer settings: pomodoro_duration_min, pomodoros_until_long_break"
        );
        assert_eq!(err.fields().len(), 2);
    }

    #[test]
    fn validation_wraps_into_core_error() {
        let err: CoreError = ValidationError::EmptyRecallSummary.into();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
