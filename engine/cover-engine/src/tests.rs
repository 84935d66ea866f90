//! Property tests across pricing, simulation and settlement

use proptest::prelude::*;

use crate::models::{Drainage, MatchStatus, PricingFactors};
use crate::payout::{PayoutEngine, PayoutTier};
use crate::pricing::{PremiumBound, PricingEngine};
use crate::simulator::{MatchSimulator, SeededSource};
use crate::tiers::{find_tier, ScenarioTag, TierId};

fn drainage() -> impl Strategy<Value = Drainage> {
    prop_oneof![
        Just(Drainage::Excellent),
        Just(Drainage::Good),
        Just(Drainage::Average),
        Just(Drainage::Poor),
    ]
}

fn priced_tier() -> impl Strategy<Value = TierId> {
    prop_oneof![Just(TierId::Basic), Just(TierId::Standard), Just(TierId::Premium)]
}

fn any_tier() -> impl Strategy<Value = TierId> {
    prop_oneof![
        Just(TierId::Basic),
        Just(TierId::Standard),
        Just(TierId::Premium),
        Just(TierId::Group),
    ]
}

proptest! {
    #[test]
    fn premium_is_monotone_in_rain_risk(
        tier in any_tier(),
        ticket in 100i64..50_000,
        drainage in drainage(),
        coverage in 0u8..=100,
        venue in 0.5f64..2.0,
        low in 0u8..=100,
        high in 0u8..=100,
        outstation in any::<bool>(),
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let engine = PricingEngine::default();
        let factors = |risk: u8| {
            PricingFactors::new(risk as f64, drainage, coverage as f64).with_venue_multiplier(venue)
        };
        prop_assert!(
            engine.price(tier, ticket, &factors(low), outstation)
                <= engine.price(tier, ticket, &factors(high), outstation)
        );
    }

    #[test]
    fn premium_respects_floor_then_ceiling(
        tier in priced_tier(),
        ticket in 100i64..50_000,
        drainage in drainage(),
        risk in 0u8..=100,
        outstation in any::<bool>(),
    ) {
        let engine = PricingEngine::default();
        let factors = PricingFactors::new(risk as f64, drainage, 20.0);
        let quote = engine.quote(tier, ticket, &factors, outstation);

        prop_assert!(quote.total_premium as f64 <= quote.ceiling.round());
        if quote.ceiling >= quote.floor {
            prop_assert!(quote.total_premium as f64 >= quote.floor.round());
        } else {
            prop_assert_eq!(quote.bound, PremiumBound::Ceiling);
        }
    }

    #[test]
    fn tiers_are_ordered_by_price(
        ticket in 100i64..50_000,
        drainage in drainage(),
        coverage in 0u8..=100,
        risk in 0u8..=100,
        outstation in any::<bool>(),
    ) {
        let engine = PricingEngine::default();
        let factors = PricingFactors::new(risk as f64, drainage, coverage as f64);
        let basic = engine.price(TierId::Basic, ticket, &factors, outstation);
        let standard = engine.price(TierId::Standard, ticket, &factors, outstation);
        let premium = engine.price(TierId::Premium, ticket, &factors, outstation);
        prop_assert!(basic <= standard);
        prop_assert!(standard <= premium);
    }

    #[test]
    fn simulated_overs_stay_in_range(risk in 0u8..=100, seed in any::<u64>()) {
        let simulator = MatchSimulator::default();
        let mut rng = SeededSource::new(seed);
        for _ in 0..20 {
            let status = simulator.simulate(risk, &mut rng);
            if status.match_abandoned {
                prop_assert_eq!(status.overs_played, 0);
            } else {
                prop_assert!((5..=20).contains(&status.overs_played));
            }
            if status.overs_played < 20 && !status.match_abandoned {
                prop_assert!(status.dls_applied);
            }
        }
    }

    #[test]
    fn classification_partitions_overs_lost(played in 0u32..=20, dls in any::<bool>()) {
        let status = MatchStatus { total_overs: 20, overs_played: played, dls_applied: dls, match_abandoned: false };
        let result = PayoutEngine::classify(&status);
        let lost = (20 - played) as f64 * 5.0;

        let expected = if played < 5 {
            PayoutTier::Severe
        } else if !dls || lost < 10.0 {
            PayoutTier::None
        } else if lost <= 25.0 {
            PayoutTier::Minor
        } else if lost <= 50.0 {
            PayoutTier::Significant
        } else {
            PayoutTier::Severe
        };
        prop_assert_eq!(result.payout_tier, expected);
        prop_assert_eq!(result.abandoned, played < 5);
    }

    #[test]
    fn settlement_never_pays_without_a_scenario(ticket in 1i64..50_000) {
        for tier in TierId::ALL {
            prop_assert_eq!(PayoutEngine::settle(find_tier(tier), ticket, None), 0);
        }
    }

    #[test]
    fn abandonment_pays_at_least_the_ticket(ticket in 1i64..50_000) {
        for tier in TierId::ALL {
            prop_assert!(
                PayoutEngine::settle(find_tier(tier), ticket, Some(ScenarioTag::Abandoned)) >= ticket
            );
        }
    }
}
