use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::EngineError;
use crate::models::Drainage;
use crate::tiers::{ScenarioTag, TierId};

/// Configuration for the cover engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Premium calculation tables
    pub pricing: PricingConfig,

    /// Match simulation parameters
    pub simulator: SimulatorConfig,

    /// Tier recommendation thresholds
    pub advisor: AdvisorConfig,
}

/// Actuarial tables used by the pricing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Tier-independent loss buckets, each linear in rain risk
    #[serde(default)]
    pub loss_buckets: Vec<LossBucket>,

    /// Multiplier on expected loss per drainage grade
    pub drainage_factors: DrainageFactors,

    /// Coverage discount is `1 - covered / coverage_divisor`
    pub coverage_divisor: f64,

    /// Loading for uncertainty and operating costs
    pub loading_factor: f64,

    /// Profit margin applied after admin cost
    pub profit_margin: f64,

    /// Historical per-venue multipliers keyed by stadium id
    #[serde(default)]
    pub venue_risk_multipliers: BTreeMap<String, f64>,

    /// Multiplier for venues missing from the table
    pub default_venue_multiplier: f64,

    pub basic: TierPricing,
    pub standard: TierPricing,
    pub premium: TierPricing,
    pub group: GroupPricing,
}

/// Probability bucket of the base expected loss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossBucket {
    pub scenario: ScenarioTag,
    /// Probability at 100% rain risk
    pub probability_weight: f64,
    /// Share of the ticket paid out
    pub payout_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrainageFactors {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub poor: f64,
}

impl DrainageFactors {
    pub fn factor(&self, drainage: Drainage) -> f64 {
        match drainage {
            Drainage::Excellent => self.excellent,
            Drainage::Good => self.good,
            Drainage::Average => self.average,
            Drainage::Poor => self.poor,
        }
    }
}

/// Pricing layer for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPricing {
    /// Fixed admin cost added to the loaded loss
    pub admin_cost: f64,
    /// Minimum premium
    pub floor: f64,
    /// Maximum premium as a share of the ticket value
    pub ceiling_fraction: f64,
    /// Extra expected-loss terms this tier adds on top of the tier below
    #[serde(default)]
    pub add_ons: Vec<AddOnRisk>,
}

/// Additional expected-loss term: `risk * probability_weight * amount`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnRisk {
    pub name: String,
    pub probability_weight: f64,
    pub amount: f64,
    /// Only counted for outstation fans
    #[serde(default)]
    pub outstation_only: bool,
}

impl AddOnRisk {
    fn new(name: &str, probability_weight: f64, amount: f64) -> Self {
        Self { name: name.to_string(), probability_weight, amount, outstation_only: false }
    }
}

/// Group pricing is derived from another tier on a multiple of the ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPricing {
    pub base_tier: TierId,
    pub headcount: u32,
    /// 0.15 = 15% off
    pub discount: f64,
}

/// Match simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub total_overs: u32,
    pub min_overs_for_result: u32,
    /// Abandonment chance is `rain_risk * abandonment_factor` percent
    pub abandonment_factor: f64,
}

/// Tier recommendation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub premium_ticket_threshold: i64,
    pub premium_risk_threshold: u8,
    pub standard_ticket_threshold: i64,
    pub standard_risk_threshold: u8,
    /// Total investment above which cover is recommended regardless of moderate risk
    #[serde(default)]
    pub high_investment_threshold: Option<i64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let venue_risk_multipliers = [
            ("mum", 1.5), // monsoon exposure
            ("blr", 1.3),
            ("kol", 1.3),
            ("che", 1.0),
            ("del", 0.9),
            ("ahm", 0.8),
            ("dha", 1.2), // mountain weather
            ("pun", 1.1),
            ("jai", 0.8),
            ("lko", 1.0),
        ]
        .into_iter()
        .map(|(id, m)| (id.to_string(), m))
        .collect();

        let mut accommodation = AddOnRisk::new("accommodation", 0.01, 3000.0);
        accommodation.outstation_only = true;

        Self {
            loss_buckets: vec![
                LossBucket {
                    scenario: ScenarioTag::Abandoned,
                    probability_weight: 0.01,
                    payout_fraction: 1.0,
                },
                LossBucket {
                    scenario: ScenarioTag::Severe,
                    probability_weight: 0.01,
                    payout_fraction: 1.0,
                },
                LossBucket {
                    scenario: ScenarioTag::Significant,
                    probability_weight: 0.02,
                    payout_fraction: 0.5,
                },
                LossBucket {
                    scenario: ScenarioTag::Minor,
                    probability_weight: 0.02,
                    payout_fraction: 0.25,
                },
            ],
            drainage_factors: DrainageFactors {
                excellent: 0.7,
                good: 0.85,
                average: 1.0,
                poor: 1.2,
            },
            coverage_divisor: 200.0,
            loading_factor: 1.5,
            profit_margin: 1.2,
            venue_risk_multipliers,
            default_venue_multiplier: 1.0,
            basic: TierPricing {
                admin_cost: 15.0,
                floor: 99.0,
                ceiling_fraction: 0.20,
                add_ons: Vec::new(),
            },
            standard: TierPricing {
                admin_cost: 20.0,
                floor: 199.0,
                ceiling_fraction: 0.25,
                add_ons: vec![
                    AddOnRisk::new("travel_allowance", 0.01, 750.0),
                    AddOnRisk::new("inconvenience", 0.04, 250.0),
                ],
            },
            premium: TierPricing {
                admin_cost: 30.0,
                floor: 499.0,
                ceiling_fraction: 0.35,
                add_ons: vec![
                    accommodation,
                    AddOnRisk::new("stadium_stranded", 0.05, 300.0),
                    AddOnRisk::new("rain_check", 0.01, 500.0),
                ],
            },
            group: GroupPricing { base_tier: TierId::Premium, headcount: 5, discount: 0.15 },
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            total_overs: crate::DEFAULT_TOTAL_OVERS,
            min_overs_for_result: crate::MIN_OVERS_FOR_RESULT,
            abandonment_factor: 0.3,
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            premium_ticket_threshold: 5000,
            premium_risk_threshold: 60,
            standard_ticket_threshold: 2000,
            standard_risk_threshold: 30,
            high_investment_threshold: Some(8000),
        }
    }
}

impl PricingConfig {
    /// Venue multiplier for a stadium id, falling back to the default
    pub fn venue_multiplier(&self, stadium_id: &str) -> f64 {
        self.venue_risk_multipliers
            .get(stadium_id)
            .copied()
            .unwrap_or(self.default_venue_multiplier)
    }

    /// Pricing layers a tier stacks, cheapest first. Group has no layers of its own.
    pub fn layers(&self, tier: TierId) -> Vec<&TierPricing> {
        match tier {
            TierId::Basic => vec![&self.basic],
            TierId::Standard => vec![&self.basic, &self.standard],
            TierId::Premium => vec![&self.basic, &self.standard, &self.premium],
            TierId::Group => Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load defaults overridden by an optional TOML/JSON file and `COVER_` environment variables
    ///
    /// Nested keys use a double underscore, e.g. `COVER_PRICING__LOADING_FACTOR=1.6`.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            tracing::debug!("Loading engine configuration from {:?}", path);
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("COVER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, EngineError> {
        Self::load(None)
    }

    /// Reject tables that would break the pricing invariants
    pub fn validate(&self) -> Result<(), EngineError> {
        let pricing = &self.pricing;

        if pricing.loading_factor <= 0.0 || pricing.profit_margin <= 0.0 {
            return Err(EngineError::invalid_config("loading factor and margin must be positive"));
        }
        if pricing.coverage_divisor < 100.0 {
            return Err(EngineError::invalid_config(format!(
                "coverage divisor {} would allow a negative coverage discount",
                pricing.coverage_divisor
            )));
        }
        let mut seen = Vec::with_capacity(pricing.loss_buckets.len());
        for bucket in &pricing.loss_buckets {
            if seen.contains(&bucket.scenario) {
                return Err(EngineError::invalid_config(format!(
                    "loss bucket for {:?} listed twice",
                    bucket.scenario
                )));
            }
            if bucket.probability_weight < 0.0 || !(0.0..=1.0).contains(&bucket.payout_fraction) {
                return Err(EngineError::invalid_config(format!(
                    "loss bucket for {:?} has a negative weight or a payout outside [0, 1]",
                    bucket.scenario
                )));
            }
            seen.push(bucket.scenario);
        }
        let drainage = &pricing.drainage_factors;
        if [drainage.excellent, drainage.good, drainage.average, drainage.poor]
            .iter()
            .any(|f| *f <= 0.0)
        {
            return Err(EngineError::invalid_config("drainage factors must be positive"));
        }
        for (name, layer) in
            [("basic", &pricing.basic), ("standard", &pricing.standard), ("premium", &pricing.premium)]
        {
            if layer.floor < 0.0 || layer.admin_cost < 0.0 {
                return Err(EngineError::invalid_config(format!(
                    "{} floor and admin cost must be non-negative",
                    name
                )));
            }
            if layer.ceiling_fraction <= 0.0 || layer.ceiling_fraction > 1.0 {
                return Err(EngineError::invalid_config(format!(
                    "{} ceiling fraction {} must be in (0, 1]",
                    name, layer.ceiling_fraction
                )));
            }
        }
        if pricing.group.base_tier == TierId::Group {
            return Err(EngineError::invalid_config("group pricing cannot be based on itself"));
        }
        if !(0.0..1.0).contains(&pricing.group.discount) || pricing.group.headcount == 0 {
            return Err(EngineError::invalid_config("group discount or headcount out of range"));
        }
        if self.simulator.total_overs < self.simulator.min_overs_for_result {
            return Err(EngineError::invalid_config("total overs below the minimum for a result"));
        }

        Ok(())
    }
}
