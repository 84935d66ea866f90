//! Error types for the preference store

use thiserror::Error;

/// Result type alias for preference operations
pub type Result<T> = std::result::Result<T, PreferenceError>;

/// Errors that can occur while reading or writing preferences
#[derive(Error, Debug)]
pub enum PreferenceError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format or corruption
    #[error("Data corruption: {0}")]
    Corruption(String),
}

impl PreferenceError {
    /// Create a new corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }
}
