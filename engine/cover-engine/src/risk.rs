//! Rain risk assessment
//!
//! The match window is the first six forecast hours. Confidence decays with distance
//! from the start of the window, so hour `i` is weighted `1 - 0.1 * i`.

use tracing::debug;

use crate::error::EngineError;
use crate::models::{HourlyForecast, MatchSuitability, RainRiskAssessment};
use crate::CRITICAL_HOURS;

pub struct RiskAssessor;

impl RiskAssessor {
    /// Weight of the hour at `index` within the match window
    pub fn hour_weight(index: usize) -> f64 {
        1.0 - index as f64 * 0.1
    }

    /// Weighted rain risk over the match window, 0-100
    pub fn rain_risk(hourly: &[HourlyForecast]) -> Result<u8, EngineError> {
        let window = &hourly[..hourly.len().min(CRITICAL_HOURS)];
        if window.is_empty() {
            return Err(EngineError::InsufficientForecast);
        }

        let (weighted, total_weight) =
            window.iter().enumerate().fold((0.0, 0.0), |(sum, weights), (i, hour)| {
                let weight = Self::hour_weight(i);
                (sum + hour.precipitation_probability * weight, weights + weight)
            });

        let risk = (weighted / total_weight).round().clamp(0.0, 100.0) as u8;
        debug!("Rain risk over {} critical hours: {}%", window.len(), risk);
        Ok(risk)
    }

    /// Rain risk plus its suitability label
    pub fn assess(hourly: &[HourlyForecast]) -> Result<RainRiskAssessment, EngineError> {
        let rain_risk = Self::rain_risk(hourly)?;
        Ok(RainRiskAssessment { rain_risk, suitability: MatchSuitability::from_rain_risk(rain_risk) })
    }
}
