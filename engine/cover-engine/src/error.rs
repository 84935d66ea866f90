//! Error types for the cover engine

use thiserror::Error;

use crate::tiers::TierId;

/// Errors raised by engine lookups and configuration
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown stadium: {stadium_id}")]
    UnknownStadium { stadium_id: String },

    #[error("Unknown insurance tier: {tier_id}")]
    UnknownTier { tier_id: String },

    #[error("Forecast has no hourly entries to assess")]
    InsufficientForecast,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl EngineError {
    /// Create a new invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }
}

/// Errors raised by the match day session (the caller-side wallet and policy glue)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Insufficient funds: premium {premium}, wallet {wallet}")]
    InsufficientFunds { premium: i64, wallet: i64 },

    #[error("A {tier} policy is already active")]
    PolicyAlreadyActive { tier: TierId },

    #[error("No active policy to settle")]
    NoActivePolicy,

    #[error("Ticket value must be positive, got {ticket_value}")]
    InvalidTicketValue { ticket_value: i64 },
}
