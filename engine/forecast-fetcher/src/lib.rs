//! Forecast Fetcher
//!
//! Pulls the hourly forecast for a stadium from Open-Meteo and turns it into the
//! match-window slice the cover engine prices against. Retries and stale-selection
//! handling are caller tools; the engine itself never touches the network.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod retry;
pub mod selection;

pub use config::{FetcherConfig, RetryConfig};
pub use error::{FetchError, Result};
pub use fetcher::ForecastFetcher;
pub use models::*;
pub use retry::retry_with_backoff;
pub use selection::{LatestSelection, SelectionTicket};
