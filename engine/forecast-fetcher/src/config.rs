use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the forecast fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Open-Meteo forecast endpoint
    pub base_url: String,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Days of hourly data to request
    pub forecast_days: u32,

    /// Hourly entries kept from the current hour onward
    pub window_hours: usize,

    /// Retry configuration
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Initial retry delay in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum retry delay in milliseconds
    pub max_delay_ms: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timeout_secs: 10,
            forecast_days: 2,
            window_hours: 12,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, initial_delay_ms: 500, max_delay_ms: 5_000, backoff_multiplier: 2.0 }
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Delay after `current`, capped at the configured maximum
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next = current.as_millis() as f64 * self.backoff_multiplier;
        Duration::from_millis(next.min(self.max_delay_ms as f64) as u64)
    }
}

impl FetcherConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("COVER_FORECAST_URL") {
            config.base_url = url;
        }

        if let Some(timeout) = env_parse("COVER_FORECAST_TIMEOUT_SECS") {
            config.timeout_secs = timeout;
        }

        if let Some(days) = env_parse("COVER_FORECAST_DAYS") {
            config.forecast_days = days;
        }

        if let Some(attempts) = env_parse("COVER_FORECAST_RETRIES") {
            config.retry.max_attempts = attempts;
        }

        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}
