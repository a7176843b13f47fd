//! Settings error types.

use thiserror::Error;

/// Failures while reading, validating or rewriting the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or replacing the file failed.
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON, or a value has the wrong type.
    #[error("settings file is not valid: {0}")]
    Json(#[from] serde_json::Error),
    /// A required key is absent. Holds the dotted key path.
    #[error("settings file format error: missing `{0}`")]
    MissingKey(String),
    /// A value is present but unusable.
    #[error("settings value rejected: {0}")]
    InvalidValue(String),
}

/// Shorthand for settings results.
pub type Result<T> = std::result::Result<T, SettingsError>;
