use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{PricingConfig, TierPricing};
use crate::models::{PricingFactors, Stadium};
use crate::tiers::TierId;

/// Which bound, if any, decided the premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumBound {
    Unbounded,
    Floor,
    Ceiling,
}

/// Premium calculation with its intermediate values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub tier: TierId,
    /// Ticket value the layers were priced on (the group multiple for group cover)
    pub priced_ticket_value: i64,
    /// Tier-independent expected loss before venue adjustments
    pub base_expected_loss: f64,
    pub venue_multiplier: f64,
    pub drainage_factor: f64,
    pub coverage_discount: f64,
    /// Expected loss from the tier add-ons
    pub add_on_loss: f64,
    /// Adjusted base loss plus add-ons
    pub expected_loss: f64,
    pub loaded_loss: f64,
    pub admin_cost: f64,
    /// `(loaded_loss + admin_cost) * margin` before bounds
    pub raw_premium: f64,
    pub floor: f64,
    pub ceiling: f64,
    pub bound: PremiumBound,
    /// Set for group cover
    pub group_discount: Option<f64>,
    pub total_premium: i64,
}

/// Turns rain risk and venue attributes into a premium per tier
///
/// Each tier's expected loss is the tier below plus its own add-on terms, so for identical
/// inputs basic <= standard <= premium.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

impl PricingEngine {
    /// Create a new pricing engine
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Pricing factors for a catalog stadium at the given rain risk
    pub fn factors_for(&self, stadium: &Stadium, rain_risk: u8) -> PricingFactors {
        PricingFactors::new(rain_risk as f64, stadium.drainage, stadium.covered_percent as f64)
            .with_venue_multiplier(self.config.venue_multiplier(&stadium.id))
    }

    /// Tier-independent expected loss for a ticket, before venue adjustments
    pub fn base_expected_loss(&self, risk_scalar: f64, ticket_value: f64) -> f64 {
        self.config.loss_buckets.iter().fold(0.0, |loss, bucket| {
            let probability = risk_scalar * bucket.probability_weight;
            loss + probability * ticket_value * bucket.payout_fraction
        })
    }

    fn add_on_loss(layer: &TierPricing, risk_scalar: f64, is_outstation: bool) -> f64 {
        layer
            .add_ons
            .iter()
            .filter(|add_on| is_outstation || !add_on.outstation_only)
            .fold(0.0, |loss, add_on| loss + risk_scalar * add_on.probability_weight * add_on.amount)
    }

    /// Premium for a tier, in whole rupees
    pub fn price(
        &self,
        tier: TierId,
        ticket_value: i64,
        factors: &PricingFactors,
        is_outstation: bool,
    ) -> i64 {
        self.quote(tier, ticket_value, factors, is_outstation).total_premium
    }

    /// Premium for every tier, cheapest first
    pub fn price_all(
        &self,
        ticket_value: i64,
        factors: &PricingFactors,
        is_outstation: bool,
    ) -> Vec<(TierId, i64)> {
        TierId::ALL
            .iter()
            .map(|tier| (*tier, self.price(*tier, ticket_value, factors, is_outstation)))
            .collect()
    }

    /// Premium for a tier with its intermediate values
    pub fn quote(
        &self,
        tier: TierId,
        ticket_value: i64,
        factors: &PricingFactors,
        is_outstation: bool,
    ) -> PremiumBreakdown {
        if tier == TierId::Group {
            return self.quote_group(ticket_value, factors, is_outstation);
        }

        let layers = self.config.layers(tier);
        let top = layers[layers.len() - 1];
        let risk = factors.risk_scalar();
        let ticket = ticket_value as f64;

        let base_expected_loss = self.base_expected_loss(risk, ticket);
        let drainage_factor = self.config.drainage_factors.factor(factors.stadium_drainage);
        let coverage_discount = 1.0 - factors.stadium_coverage / self.config.coverage_divisor;

        let adjusted_loss = base_expected_loss
            * factors.venue_risk_multiplier
            * drainage_factor
            * coverage_discount
            * factors.seasonal_factor;

        let mut expected_loss = adjusted_loss;
        for layer in &layers {
            expected_loss += Self::add_on_loss(layer, risk, is_outstation);
        }

        let loaded_loss = expected_loss * self.config.loading_factor;
        let raw_premium = (loaded_loss + top.admin_cost) * self.config.profit_margin;
        let ceiling = ticket * top.ceiling_fraction;

        // Floor first, then ceiling: for very cheap tickets the ceiling wins.
        let floored = raw_premium.max(top.floor);
        let bounded = floored.min(ceiling);
        let bound = if bounded < floored {
            PremiumBound::Ceiling
        } else if floored > raw_premium {
            PremiumBound::Floor
        } else {
            PremiumBound::Unbounded
        };
        let total_premium = bounded.round() as i64;

        debug!(
            "Priced {} cover for ticket {}: expected loss {:.2}, raw {:.2}, premium {} ({:?})",
            tier, ticket_value, expected_loss, raw_premium, total_premium, bound
        );

        PremiumBreakdown {
            tier,
            priced_ticket_value: ticket_value,
            base_expected_loss,
            venue_multiplier: factors.venue_risk_multiplier,
            drainage_factor,
            coverage_discount,
            add_on_loss: expected_loss - adjusted_loss,
            expected_loss,
            loaded_loss,
            admin_cost: top.admin_cost,
            raw_premium,
            floor: top.floor,
            ceiling,
            bound,
            group_discount: None,
            total_premium,
        }
    }

    fn quote_group(
        &self,
        ticket_value: i64,
        factors: &PricingFactors,
        is_outstation: bool,
    ) -> PremiumBreakdown {
        let group = &self.config.group;
        let base_tier = match group.base_tier {
            TierId::Group => {
                warn!("Group pricing cannot be based on itself, using premium");
                TierId::Premium
            }
            tier => tier,
        };
        let group_ticket = ticket_value * group.headcount as i64;
        let mut breakdown = self.quote(base_tier, group_ticket, factors, is_outstation);

        let discounted = (breakdown.total_premium as f64 * (1.0 - group.discount)).round() as i64;
        debug!(
            "Group cover for {} x {}: {} before discount, {} after",
            group.headcount, ticket_value, breakdown.total_premium, discounted
        );

        breakdown.tier = TierId::Group;
        breakdown.group_discount = Some(group.discount);
        breakdown.total_premium = discounted;
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_stadium;
    use crate::models::Drainage;

    fn engine() -> PricingEngine {
        PricingEngine::default()
    }

    #[test]
    fn test_zero_risk_charges_the_floor() {
        let factors = PricingFactors::new(0.0, Drainage::Good, 20.0);
        let quote = engine().quote(TierId::Basic, 2500, &factors, false);

        assert_eq!(quote.expected_loss, 0.0);
        assert_eq!(quote.bound, PremiumBound::Floor);
        assert_eq!(quote.total_premium, 99);
    }

    #[test]
    fn test_full_risk_poor_drainage_basic() {
        let factors =
            PricingFactors::new(100.0, Drainage::Poor, 0.0).with_venue_multiplier(1.5);
        let quote = engine().quote(TierId::Basic, 2500, &factors, false);

        // (25 + 25 + 25 + 12.5) * 1.5 venue * 1.2 drainage * 1.0 coverage
        let expected_loss: f64 = (0.01 * 2500.0 + 0.01 * 2500.0 + 0.02 * 2500.0 * 0.5
            + 0.02 * 2500.0 * 0.25)
            * 1.5
            * 1.2;
        assert!((quote.expected_loss - expected_loss).abs() < 1e-9);
        assert!((quote.expected_loss - 157.5).abs() < 1e-9);

        let expected_premium = ((expected_loss * 1.5 + 15.0) * 1.2).round().min(500.0) as i64;
        assert_eq!(quote.total_premium, expected_premium);
        assert_eq!(quote.total_premium, 302);
        assert_eq!(quote.bound, PremiumBound::Unbounded);
    }

    #[test]
    fn test_ceiling_overrides_floor_for_cheap_tickets() {
        let factors = PricingFactors::new(50.0, Drainage::Average, 0.0);
        // Ceiling 300 * 0.2 = 60 is below the 99 floor
        let quote = engine().quote(TierId::Basic, 300, &factors, false);
        assert_eq!(quote.bound, PremiumBound::Ceiling);
        assert_eq!(quote.total_premium, 60);

        // Standard: 300 * 0.25 = 75 < 199
        assert_eq!(engine().price(TierId::Standard, 300, &factors, false), 75);
    }

    #[test]
    fn test_standard_adds_travel_and_inconvenience() {
        let factors = PricingFactors::new(100.0, Drainage::Average, 0.0);
        let basic = engine().quote(TierId::Basic, 10_000, &factors, false);
        let standard = engine().quote(TierId::Standard, 10_000, &factors, false);

        // 0.01 * 750 + 0.04 * 250
        assert!((standard.add_on_loss - 17.5).abs() < 1e-9);
        assert!((standard.expected_loss - (basic.expected_loss + 17.5)).abs() < 1e-9);
        assert_eq!(standard.admin_cost, 20.0);
        // (367.5 * 1.5 + 20) * 1.2 = 685.5
        assert_eq!(standard.total_premium, 686);
    }

    #[test]
    fn test_premium_accommodation_only_for_outstation() {
        let factors = PricingFactors::new(100.0, Drainage::Average, 0.0);
        let local = engine().quote(TierId::Premium, 10_000, &factors, false);
        let outstation = engine().quote(TierId::Premium, 10_000, &factors, true);

        // Local add-ons: standard 17.5 + stranded 15 + rain check 5
        assert!((local.add_on_loss - 37.5).abs() < 1e-9);
        // Accommodation adds 0.01 * 3000
        assert!((outstation.add_on_loss - local.add_on_loss - 30.0).abs() < 1e-9);
        assert!(outstation.total_premium > local.total_premium);
    }

    #[test]
    fn test_group_prices_premium_on_five_tickets_with_discount() {
        let factors = PricingFactors::new(0.0, Drainage::Good, 20.0);
        let quote = engine().quote(TierId::Group, 2500, &factors, false);

        // Premium floor 499 on 12,500 worth of tickets, minus 15%
        assert_eq!(quote.priced_ticket_value, 12_500);
        assert_eq!(quote.group_discount, Some(0.15));
        assert_eq!(quote.total_premium, 424);
    }

    #[test]
    fn test_group_ceiling_binds_before_discount() {
        let factors = PricingFactors::new(50.0, Drainage::Poor, 0.0);
        let quote = engine().quote(TierId::Group, 100, &factors, false);

        // 500 worth of tickets caps premium at 175, below its 499 floor
        assert_eq!(quote.priced_ticket_value, 500);
        assert_eq!(quote.ceiling, 175.0);
        assert_eq!(quote.bound, PremiumBound::Ceiling);
        // 175 * 0.85 = 148.75
        assert_eq!(quote.total_premium, 149);
    }

    #[test]
    fn test_group_based_on_itself_falls_back_to_premium() {
        let mut config = PricingConfig::default();
        config.group.base_tier = TierId::Group;
        let factors = PricingFactors::new(0.0, Drainage::Good, 20.0);

        let quote = PricingEngine::new(config).quote(TierId::Group, 2500, &factors, false);
        assert_eq!(quote.tier, TierId::Group);
        assert_eq!(quote.total_premium, 424);
    }

    #[test]
    fn test_tier_ordering_at_catalog_venue() {
        let stadium = find_stadium("mum").unwrap();
        let engine = engine();
        for risk in [0u8, 25, 50, 75, 100] {
            let factors = engine.factors_for(stadium, risk);
            let basic = engine.price(TierId::Basic, 2500, &factors, false);
            let standard = engine.price(TierId::Standard, 2500, &factors, false);
            let premium = engine.price(TierId::Premium, 2500, &factors, false);
            assert!(basic <= standard && standard <= premium, "risk {}", risk);
        }
    }

    #[test]
    fn test_factors_for_uses_venue_table() {
        let engine = engine();
        let factors = engine.factors_for(find_stadium("ahm").unwrap(), 35);
        assert_eq!(factors.venue_risk_multiplier, 0.8);
        assert_eq!(factors.stadium_drainage, Drainage::Excellent);
        assert_eq!(factors.stadium_coverage, 30.0);
        assert_eq!(factors.base_rain_risk, 35.0);
    }

    #[test]
    fn test_price_all_lists_every_tier() {
        let factors = PricingFactors::new(30.0, Drainage::Average, 10.0);
        let prices = engine().price_all(2500, &factors, false);
        let tiers: Vec<TierId> = prices.iter().map(|(t, _)| *t).collect();
        assert_eq!(tiers, TierId::ALL.to_vec());
    }
}
