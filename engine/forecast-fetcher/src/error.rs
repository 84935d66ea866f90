//! Error types for forecast fetching

use thiserror::Error;

/// Errors raised while fetching or reading a forecast
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Forecast request failed: {message}")]
    DataFetch {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Forecast payload malformed: {message}")]
    Malformed { message: String },
}

impl FetchError {
    pub fn data_fetch(message: impl Into<String>) -> Self {
        Self::DataFetch { message: message.into(), source: None }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed { message: message.into() }
    }

    /// Both kinds are transient from the user's point of view
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::DataFetch { .. } => true,
            FetchError::Malformed { .. } => true,
        }
    }

    /// Message shown to the user regardless of the underlying cause
    pub fn user_message(&self) -> &'static str {
        "Failed to fetch weather data. Please try again."
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::DataFetch { message: err.to_string(), source: Some(err) }
    }
}

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;
