use chrono::{DateTime, Duration, Utc};
use cover_engine::{HourlyForecast, RainRiskAssessment, RiskAssessor, CRITICAL_HOURS};
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

/// Open-Meteo `/v1/forecast` response, limited to the fields requested
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenMeteoResponse {
    /// Offset of the venue's timezone, since `timezone=auto` is requested
    #[serde(default)]
    pub utc_offset_seconds: i64,

    pub current: Option<OpenMeteoCurrent>,

    pub hourly: Option<OpenMeteoHourly>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenMeteoCurrent {
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed_10m: Option<f64>,
    pub surface_pressure: Option<f64>,
}

/// Hourly series, index-aligned
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenMeteoHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

/// Conditions at the venue right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub weather_code: i32,
}

/// Forecast for one stadium, ready for pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub stadium_id: String,
    pub fetched_at: DateTime<Utc>,
    pub current: CurrentConditions,
    /// Hourly entries from the venue-local current hour onward
    pub hourly: Vec<HourlyForecast>,
    pub assessment: RainRiskAssessment,
}

impl ForecastSnapshot {
    pub fn rain_risk(&self) -> u8 {
        self.assessment.rain_risk
    }
}

impl OpenMeteoResponse {
    /// Build a snapshot of up to `window_hours` entries starting at the venue-local hour of `now`
    pub fn into_snapshot(
        self,
        stadium_id: &str,
        now: DateTime<Utc>,
        window_hours: usize,
    ) -> Result<ForecastSnapshot> {
        let current = self.current.ok_or_else(|| FetchError::malformed("current block missing"))?;
        let hourly = self.hourly.ok_or_else(|| FetchError::malformed("hourly block missing"))?;

        let current = CurrentConditions {
            temperature: require(current.temperature_2m, "current.temperature_2m")?,
            humidity: require(current.relative_humidity_2m, "current.relative_humidity_2m")?,
            wind_speed: require(current.wind_speed_10m, "current.wind_speed_10m")?,
            pressure: require(current.surface_pressure, "current.surface_pressure")?,
            weather_code: require(current.weather_code, "current.weather_code")?,
        };

        let local_hour = (now + Duration::seconds(self.utc_offset_seconds))
            .format("%Y-%m-%dT%H:00")
            .to_string();
        let start = hourly
            .time
            .iter()
            .position(|time| time.as_str() >= local_hour.as_str())
            .ok_or_else(|| {
                FetchError::malformed(format!("no hourly entries at or after {}", local_hour))
            })?;

        let end = (start + window_hours).min(hourly.time.len());
        let entries = (start..end)
            .map(|i| hourly_entry(&hourly, i))
            .collect::<Result<Vec<_>>>()?;

        if entries.len() < CRITICAL_HOURS {
            return Err(FetchError::malformed(format!(
                "only {} hourly entries from {}, need {}",
                entries.len(),
                local_hour,
                CRITICAL_HOURS
            )));
        }

        let assessment =
            RiskAssessor::assess(&entries).map_err(|e| FetchError::malformed(e.to_string()))?;

        Ok(ForecastSnapshot {
            stadium_id: stadium_id.to_string(),
            fetched_at: now,
            current,
            hourly: entries,
            assessment,
        })
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| FetchError::malformed(format!("{} missing", field)))
}

fn hourly_entry(hourly: &OpenMeteoHourly, i: usize) -> Result<HourlyForecast> {
    let field = |name: &str| FetchError::malformed(format!("hourly.{} shorter than hourly.time", name));

    let temperature = *hourly.temperature_2m.get(i).ok_or_else(|| field("temperature_2m"))?;
    let probability =
        *hourly.precipitation_probability.get(i).ok_or_else(|| field("precipitation_probability"))?;
    let precipitation = *hourly.precipitation.get(i).ok_or_else(|| field("precipitation"))?;
    let weather_code = *hourly.weather_code.get(i).ok_or_else(|| field("weather_code"))?;

    Ok(HourlyForecast {
        time: hourly.time[i].clone(),
        temperature: require(temperature, "temperature_2m")?,
        precipitation_probability: probability.unwrap_or(0.0),
        precipitation: precipitation.unwrap_or(0.0),
        weather_code: require(weather_code, "weather_code")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(hours: usize, probabilities: Vec<serde_json::Value>) -> serde_json::Value {
        let time: Vec<String> = (0..hours)
            .map(|h| format!("2026-04-{:02}T{:02}:00", 12 + h / 24, h % 24))
            .collect();
        json!({
            "utc_offset_seconds": 19800,
            "current": {
                "temperature_2m": 29.4,
                "relative_humidity_2m": 78.0,
                "weather_code": 61,
                "wind_speed_10m": 12.3,
                "surface_pressure": 1004.6
            },
            "hourly": {
                "time": time,
                "temperature_2m": vec![28.0; hours],
                "precipitation_probability": probabilities,
                "precipitation": vec![serde_json::Value::Null; hours],
                "weather_code": vec![3; hours]
            }
        })
    }

    fn parse(value: serde_json::Value, now: DateTime<Utc>) -> Result<ForecastSnapshot> {
        let response: OpenMeteoResponse = serde_json::from_value(value).unwrap();
        response.into_snapshot("mum", now, 12)
    }

    #[test]
    fn test_window_starts_at_venue_local_hour() {
        // 08:30 UTC is 14:00 IST
        let now = Utc.with_ymd_and_hms(2026, 4, 12, 8, 30, 0).unwrap();
        let probs = (0..48).map(|h| json!(h)).collect();
        let snapshot = parse(payload(48, probs), now).unwrap();

        assert_eq!(snapshot.hourly.len(), 12);
        assert_eq!(snapshot.hourly[0].time, "2026-04-12T14:00");
        assert_eq!(snapshot.hourly[0].precipitation_probability, 14.0);
        assert_eq!(snapshot.hourly[11].time, "2026-04-13T01:00");
        assert_eq!(snapshot.current.weather_code, 61);
    }

    #[test]
    fn test_nulls_become_zero() {
        let now = Utc.with_ymd_and_hms(2026, 4, 12, 0, 0, 0).unwrap();
        let probs = vec![serde_json::Value::Null; 48];
        let snapshot = parse(payload(48, probs), now).unwrap();

        assert!(snapshot.hourly.iter().all(|h| h.precipitation_probability == 0.0));
        assert!(snapshot.hourly.iter().all(|h| h.precipitation == 0.0));
        assert_eq!(snapshot.rain_risk(), 0);
    }

    #[test]
    fn test_risk_is_assessed_on_the_window() {
        let now = Utc.with_ymd_and_hms(2026, 4, 12, 0, 0, 0).unwrap();
        let probs = vec![json!(40); 48];
        let snapshot = parse(payload(48, probs), now).unwrap();
        assert_eq!(snapshot.rain_risk(), 40);
    }

    #[test]
    fn test_too_few_hours_is_malformed() {
        // 22:00 IST leaves two hours of a one-day series
        let now = Utc.with_ymd_and_hms(2026, 4, 12, 16, 30, 0).unwrap();
        let probs = vec![json!(10); 24];
        let err = parse(payload(24, probs), now).unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn test_short_series_is_malformed() {
        let now = Utc.with_ymd_and_hms(2026, 4, 12, 0, 0, 0).unwrap();
        let probs = vec![json!(10); 3];
        let err = parse(payload(48, probs), now).unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn test_missing_blocks_are_malformed() {
        let now = Utc::now();
        let err = parse(json!({ "utc_offset_seconds": 0 }), now).unwrap_err();
        assert!(err.to_string().contains("current block missing"));
    }
}
