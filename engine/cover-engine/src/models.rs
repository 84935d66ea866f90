use serde::{Deserialize, Serialize};
use std::fmt;

/// Drainage quality of a venue. Better drainage lowers the effective rain risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Drainage {
    Excellent,
    Good,
    Average,
    Poor,
}

impl Drainage {
    pub fn as_str(self) -> &'static str {
        match self {
            Drainage::Excellent => "excellent",
            Drainage::Good => "good",
            Drainage::Average => "average",
            Drainage::Poor => "poor",
        }
    }
}

impl fmt::Display for Drainage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stadium reference data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stadium {
    pub id: String,
    pub name: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub capacity: u32,
    pub drainage: Drainage,
    /// Share of seating under a roof, 0-100
    pub covered_percent: u8,
}

/// Qualitative reading of the rain risk for the match window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSuitability {
    Excellent,
    Good,
    Risky,
    Poor,
}

impl MatchSuitability {
    /// Classify a rain risk percentage
    pub fn from_rain_risk(rain_risk: u8) -> Self {
        if rain_risk > 70 {
            MatchSuitability::Poor
        } else if rain_risk > 40 {
            MatchSuitability::Risky
        } else if rain_risk > 15 {
            MatchSuitability::Good
        } else {
            MatchSuitability::Excellent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchSuitability::Excellent => "Perfect Conditions",
            MatchSuitability::Good => "Good Conditions",
            MatchSuitability::Risky => "Risky Conditions",
            MatchSuitability::Poor => "Washout Risk",
        }
    }
}

/// Rain risk for the match window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainRiskAssessment {
    /// 0-100
    pub rain_risk: u8,
    pub suitability: MatchSuitability,
}

/// One hourly forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Local ISO timestamp as reported by the forecast source
    pub time: String,
    pub temperature: f64,
    /// 0-100
    pub precipitation_probability: f64,
    /// Millimetres
    pub precipitation: f64,
    pub weather_code: i32,
}

/// Inputs to the premium calculation that describe the venue and the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingFactors {
    /// 0-100, from the risk assessor
    pub base_rain_risk: f64,
    pub stadium_drainage: Drainage,
    /// Covered seating percentage, 0-100
    pub stadium_coverage: f64,
    /// Always 1.0 for now
    pub seasonal_factor: f64,
    pub venue_risk_multiplier: f64,
}

impl PricingFactors {
    pub fn new(base_rain_risk: f64, stadium_drainage: Drainage, stadium_coverage: f64) -> Self {
        Self {
            base_rain_risk,
            stadium_drainage,
            stadium_coverage,
            seasonal_factor: 1.0,
            venue_risk_multiplier: 1.0,
        }
    }

    pub fn with_venue_multiplier(mut self, venue_risk_multiplier: f64) -> Self {
        self.venue_risk_multiplier = venue_risk_multiplier;
        self
    }

    /// Rain risk as a probability-like scalar in [0, 1]
    pub fn risk_scalar(&self) -> f64 {
        self.base_rain_risk / 100.0
    }
}

/// Outcome of one simulated match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatus {
    pub total_overs: u32,
    pub overs_played: u32,
    pub dls_applied: bool,
    pub match_abandoned: bool,
}

impl MatchStatus {
    pub fn completed(total_overs: u32) -> Self {
        Self { total_overs, overs_played: total_overs, dls_applied: false, match_abandoned: false }
    }

    pub fn abandoned(total_overs: u32) -> Self {
        Self { total_overs, overs_played: 0, dls_applied: false, match_abandoned: true }
    }

    pub fn reduced(total_overs: u32, overs_played: u32) -> Self {
        Self { total_overs, overs_played, dls_applied: true, match_abandoned: false }
    }
}

/// Settlement shown to the user once a match has been simulated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub overs_played: u32,
    pub dls_applied: bool,
    pub abandoned: bool,
    pub payout: i64,
    pub classification: crate::payout::DlsResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suitability_thresholds() {
        assert_eq!(MatchSuitability::from_rain_risk(0), MatchSuitability::Excellent);
        assert_eq!(MatchSuitability::from_rain_risk(15), MatchSuitability::Excellent);
        assert_eq!(MatchSuitability::from_rain_risk(16), MatchSuitability::Good);
        assert_eq!(MatchSuitability::from_rain_risk(40), MatchSuitability::Good);
        assert_eq!(MatchSuitability::from_rain_risk(41), MatchSuitability::Risky);
        assert_eq!(MatchSuitability::from_rain_risk(70), MatchSuitability::Risky);
        assert_eq!(MatchSuitability::from_rain_risk(71), MatchSuitability::Poor);
        assert_eq!(MatchSuitability::from_rain_risk(100), MatchSuitability::Poor);
    }

    #[test]
    fn test_drainage_serde_is_lowercase() {
        let json = serde_json::to_string(&Drainage::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
        let parsed: Drainage = serde_json::from_str("\"poor\"").unwrap();
        assert_eq!(parsed, Drainage::Poor);
    }

    #[test]
    fn test_pricing_factors_defaults() {
        let factors = PricingFactors::new(40.0, Drainage::Good, 20.0);
        assert_eq!(factors.seasonal_factor, 1.0);
        assert_eq!(factors.venue_risk_multiplier, 1.0);
        assert!((factors.risk_scalar() - 0.4).abs() < 1e-12);
    }
}
