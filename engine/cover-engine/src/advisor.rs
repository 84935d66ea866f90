//! Tier recommendation and value-for-money copy
//!
//! The expected payout here is advisory text for the user, not an actuarial quantity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AdvisorConfig;
use crate::pricing::PricingEngine;
use crate::tiers::TierId;

/// Share of ticket value assumed to be at risk when reversing expected loss into a payout
const PAYOUT_PROBABILITY: f64 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    StronglyRecommended,
    Recommended,
    Optional,
    NotRecommended,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Recommendation::StronglyRecommended => "strongly-recommended",
            Recommendation::Recommended => "recommended",
            Recommendation::Optional => "optional",
            Recommendation::NotRecommended => "not-recommended",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueProposition {
    /// Premium as a percentage of the total match day spend
    pub protection_ratio: f64,
    pub expected_roi: f64,
    /// Rain risk at which the premium pays for itself
    pub break_even_risk: f64,
    pub recommendation: Recommendation,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedValue {
    pub expected_payout: f64,
    pub expected_profit: f64,
    pub worth_it: bool,
    pub confidence: String,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationAdvisor {
    config: AdvisorConfig,
    pricing: PricingEngine,
}

impl RecommendationAdvisor {
    pub fn new(config: AdvisorConfig, pricing: PricingEngine) -> Self {
        Self { config, pricing }
    }

    /// Tier to suggest for a ticket
    pub fn recommend(&self, ticket_value: i64, rain_risk: u8, is_outstation: bool) -> TierId {
        let c = &self.config;
        if ticket_value >= c.premium_ticket_threshold
            || rain_risk >= c.premium_risk_threshold
            || is_outstation
        {
            TierId::Premium
        } else if rain_risk >= c.standard_risk_threshold || ticket_value >= c.standard_ticket_threshold
        {
            TierId::Standard
        } else {
            TierId::Basic
        }
    }

    pub fn value_proposition(
        &self,
        premium: i64,
        ticket_value: i64,
        total_investment: i64,
        rain_risk: u8,
    ) -> ValueProposition {
        let premium_f = premium as f64;
        let protection_ratio = premium_f / total_investment as f64 * 100.0;
        let expected_loss = self.pricing.base_expected_loss(rain_risk as f64 / 100.0, ticket_value as f64);
        let expected_payout = expected_loss / PAYOUT_PROBABILITY;
        let expected_roi = (expected_payout - premium_f) / premium_f * 100.0;
        let break_even_risk = premium_f / (ticket_value as f64 * PAYOUT_PROBABILITY) * 100.0;

        let high_investment =
            self.config.high_investment_threshold.is_some_and(|t| total_investment >= t);

        let (recommendation, reasoning) = if rain_risk >= 60 {
            (
                Recommendation::StronglyRecommended,
                format!(
                    "High rain risk ({}%) makes insurance essential. Protecting {} investment for just {} ({:.1}%)",
                    rain_risk,
                    format_inr(total_investment as f64),
                    format_inr(premium_f),
                    protection_ratio
                ),
            )
        } else if rain_risk >= 35 || high_investment {
            (
                Recommendation::Recommended,
                format!(
                    "Moderate risk ({}%) and significant investment make insurance worthwhile",
                    rain_risk
                ),
            )
        } else if rain_risk >= 15 {
            (
                Recommendation::Optional,
                format!(
                    "Lower risk ({}%), but insurance provides peace of mind for {:.1}% of your investment",
                    rain_risk, protection_ratio
                ),
            )
        } else {
            (
                Recommendation::NotRecommended,
                format!("Very low rain risk ({}%). You may choose to self-insure.", rain_risk),
            )
        };

        ValueProposition { protection_ratio, expected_roi, break_even_risk, recommendation, reasoning }
    }

    /// Rough expected payout and profit for buying cover
    pub fn expected_value(&self, premium: i64, coverage: i64, rain_risk: u8) -> ExpectedValue {
        let risk = rain_risk as f64 / 100.0;
        let coverage = coverage as f64;
        let p_abandonment = risk * 0.01;
        let p_significant = risk * 0.02;
        let p_minor = risk * 0.03;

        let expected_payout = p_abandonment * coverage
            + p_significant * coverage * 0.50
            + p_minor * coverage * 0.25;
        let premium = premium as f64;
        let expected_profit = expected_payout - premium;

        let confidence = if rain_risk > 70 {
            "High confidence - Strong recommendation"
        } else if rain_risk > 40 {
            "Moderate confidence - Worth considering"
        } else if rain_risk > 20 {
            "Low-moderate confidence - Optional protection"
        } else {
            "Low confidence"
        };

        ExpectedValue {
            expected_payout,
            expected_profit,
            worth_it: expected_profit > -premium * 0.5,
            confidence: confidence.to_string(),
        }
    }
}

/// Rupee amount with Indian digit grouping, e.g. `₹1,25,000.00`
pub fn format_inr(amount: f64) -> String {
    let paise = (amount.abs() * 100.0).round() as u64;
    let rupees = (paise / 100).to_string();
    let fraction = paise % 100;

    let grouped = if rupees.len() <= 3 {
        rupees
    } else {
        let (head, last_three) = rupees.split_at(rupees.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), last_three)
    };

    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };
    format!("{}₹{}.{:02}", sign, grouped, fraction)
}
