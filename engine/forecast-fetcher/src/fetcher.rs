use chrono::Utc;
use cover_engine::Stadium;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use crate::models::{ForecastSnapshot, OpenMeteoResponse};
use crate::retry::retry_with_backoff;

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m,surface_pressure";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,precipitation,weather_code";

/// Open-Meteo forecast client
pub struct ForecastFetcher {
    config: FetcherConfig,
    client: Client,
}

impl ForecastFetcher {
    /// Create a new fetcher instance
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::DataFetch {
                message: format!("failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Request URL for a stadium
    pub fn forecast_url(&self, stadium: &Stadium) -> String {
        format!(
            "{}?latitude={}&longitude={}&current={}&hourly={}&timezone=auto&forecast_days={}",
            self.config.base_url,
            stadium.lat,
            stadium.lon,
            CURRENT_FIELDS,
            HOURLY_FIELDS,
            self.config.forecast_days
        )
    }

    /// Fetch the forecast for a stadium once
    pub async fn fetch(&self, stadium: &Stadium) -> Result<ForecastSnapshot> {
        let url = self.forecast_url(stadium);
        debug!("Fetching forecast for {} from: {}", stadium.id, url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::data_fetch(format!(
                "API request failed with status: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let payload: OpenMeteoResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed(format!("invalid forecast JSON: {}", e)))?;

        let snapshot = payload.into_snapshot(&stadium.id, Utc::now(), self.config.window_hours)?;

        info!(
            "Fetched {} forecast hours for {}: rain risk {}%",
            snapshot.hourly.len(),
            stadium.id,
            snapshot.rain_risk()
        );
        Ok(snapshot)
    }

    /// Fetch with the configured retry policy
    pub async fn fetch_with_retry(&self, stadium: &Stadium) -> Result<ForecastSnapshot> {
        retry_with_backoff(|| self.fetch(stadium), &self.config.retry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cover_engine::find_stadium;

    #[test]
    fn test_forecast_url() {
        let fetcher = ForecastFetcher::new(FetcherConfig::default()).unwrap();
        let stadium = find_stadium("mum").unwrap();
        let url = fetcher.forecast_url(stadium);

        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?latitude="));
        assert!(url.contains(&format!("longitude={}", stadium.lon)));
        assert!(url.contains("&current=temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m,surface_pressure"));
        assert!(url.contains("&hourly=temperature_2m,precipitation_probability,precipitation,weather_code"));
        assert!(url.ends_with("&timezone=auto&forecast_days=2"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_fetch_error() {
        let config = FetcherConfig {
            base_url: "http://127.0.0.1:9/v1/forecast".to_string(),
            timeout_secs: 1,
            ..FetcherConfig::default()
        };
        let fetcher = ForecastFetcher::new(config).unwrap();
        let err = fetcher.fetch(find_stadium("blr").unwrap()).await.unwrap_err();
        assert!(matches!(err, FetchError::DataFetch { .. }));
        assert!(err.is_retryable());
    }
}
