//! DLS-style classification and settlement
//!
//! Tier 1 - minor disruption: 10-25% overs lost, 25% payout
//! Tier 2 - significant: 26-50% overs lost, 50% payout
//! Tier 3 - severe: more than 50% overs lost or abandoned, 100% payout

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::models::{MatchStatus, SettlementResult};
use crate::tiers::{ComponentCondition, InsuranceTier, ScenarioTag, SettlementMode};

/// Payout tier of a classified match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutTier {
    None,
    Minor,
    Significant,
    Severe,
}

impl fmt::Display for PayoutTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayoutTier::None => "none",
            PayoutTier::Minor => "minor",
            PayoutTier::Significant => "significant",
            PayoutTier::Severe => "severe",
        };
        f.write_str(name)
    }
}

/// Classification of a match outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DlsResult {
    pub overs_lost_percentage: f64,
    pub payout_tier: PayoutTier,
    pub payout_multiplier: f64,
    pub description: String,
    /// Washed out, or too few overs bowled to count as a match
    pub abandoned: bool,
}

impl DlsResult {
    fn new(
        overs_lost_percentage: f64,
        payout_tier: PayoutTier,
        payout_multiplier: f64,
        description: &str,
    ) -> Self {
        Self {
            overs_lost_percentage,
            payout_tier,
            payout_multiplier,
            description: description.to_string(),
            abandoned: false,
        }
    }

    /// Settlement scenario, or `None` when nothing pays
    pub fn scenario(&self) -> Option<ScenarioTag> {
        if self.abandoned {
            return Some(ScenarioTag::Abandoned);
        }
        match self.payout_tier {
            PayoutTier::None => None,
            PayoutTier::Minor => Some(ScenarioTag::Minor),
            PayoutTier::Significant => Some(ScenarioTag::Significant),
            PayoutTier::Severe => Some(ScenarioTag::Severe),
        }
    }
}

/// Facts about the policyholder that gate conditional components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementContext {
    pub is_outstation: bool,
    pub attends_rescheduled: bool,
}

impl SettlementContext {
    fn satisfies(&self, condition: ComponentCondition) -> bool {
        match condition {
            ComponentCondition::Always => true,
            ComponentCondition::Outstation => self.is_outstation,
            ComponentCondition::AttendsRescheduled => self.attends_rescheduled,
        }
    }
}

pub struct PayoutEngine;

impl PayoutEngine {
    /// Classify a match into a payout tier
    pub fn classify(status: &MatchStatus) -> DlsResult {
        let total = status.total_overs as f64;
        let played = status.overs_played as f64;

        // No scheduled overs cannot be scored as a result
        if status.match_abandoned || status.total_overs == 0 || played < total * 0.25 {
            return DlsResult {
                abandoned: true,
                ..DlsResult::new(100.0, PayoutTier::Severe, 1.0, "Match abandoned - Full refund")
            };
        }

        let overs_lost_percentage = (total - played) * 100.0 / total;

        if !status.dls_applied || overs_lost_percentage < 10.0 {
            DlsResult::new(overs_lost_percentage, PayoutTier::None, 0.0, "Match played as scheduled")
        } else if overs_lost_percentage <= 25.0 {
            DlsResult::new(
                overs_lost_percentage,
                PayoutTier::Minor,
                0.25,
                "DLS applied - Minor disruption (10-25% overs lost)",
            )
        } else if overs_lost_percentage <= 50.0 {
            DlsResult::new(
                overs_lost_percentage,
                PayoutTier::Significant,
                0.50,
                "DLS applied - Significant disruption (26-50% overs lost)",
            )
        } else {
            DlsResult::new(
                overs_lost_percentage,
                PayoutTier::Severe,
                1.0,
                "DLS applied - Severe disruption (>50% overs lost)",
            )
        }
    }

    /// Payout for a scenario with no conditional benefits
    pub fn settle(tier: &InsuranceTier, ticket_value: i64, scenario: Option<ScenarioTag>) -> i64 {
        Self::settle_with(tier, ticket_value, scenario, &SettlementContext::default())
    }

    /// Payout for a scenario, honouring outstation and rescheduled-attendance benefits
    pub fn settle_with(
        tier: &InsuranceTier,
        ticket_value: i64,
        scenario: Option<ScenarioTag>,
        context: &SettlementContext,
    ) -> i64 {
        let Some(scenario) = scenario else {
            return 0;
        };

        let payout = match tier.settlement_mode {
            SettlementMode::ComponentSum => tier
                .components
                .iter()
                .filter(|c| c.is_triggered_by(scenario) && context.satisfies(c.condition))
                .map(|c| c.amount.amount(ticket_value))
                .sum::<f64>(),
            SettlementMode::FlatMultiplier { factor } => {
                ticket_value as f64 * scenario.payout_multiplier() * factor
            }
        };

        let payout = payout.round() as i64;
        debug!("{} cover pays {} for {} scenario", tier.id, payout, scenario);
        payout
    }

    /// Classify a match and settle it in one step
    pub fn settle_match(
        tier: &InsuranceTier,
        ticket_value: i64,
        status: &MatchStatus,
        context: &SettlementContext,
    ) -> SettlementResult {
        let classification = Self::classify(status);
        let payout = Self::settle_with(tier, ticket_value, classification.scenario(), context);

        info!(
            "Settled {} cover: {} overs played, dls {}, abandoned {}, payout {}",
            tier.id, status.overs_played, status.dls_applied, classification.abandoned, payout
        );

        SettlementResult {
            overs_played: status.overs_played,
            dls_applied: status.dls_applied,
            abandoned: classification.abandoned,
            payout,
            classification,
        }
    }

    /// Maximum payout per scenario, for display before purchase
    pub fn scenario_payouts(
        tier: &InsuranceTier,
        ticket_value: i64,
        context: &SettlementContext,
    ) -> Vec<(ScenarioTag, i64)> {
        ScenarioTag::ALL
            .iter()
            .map(|s| (*s, Self::settle_with(tier, ticket_value, Some(*s), context)))
            .collect()
    }
}
