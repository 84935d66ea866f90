//! Random match simulation biased by rain risk
//!
//! The random source is injected so tests can script exact rolls.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::SimulatorConfig;
use crate::models::MatchStatus;

/// Source of uniform random numbers in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Seeded RNG for reproducible runs
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed sequence, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    position: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self { values: values.into(), position: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

/// Produces a random match outcome for a rain risk
#[derive(Debug, Clone, Default)]
pub struct MatchSimulator {
    config: SimulatorConfig,
}

impl MatchSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn total_overs(&self) -> u32 {
        self.config.total_overs
    }

    /// Simulate with the configured match length
    pub fn simulate<R: RandomSource + ?Sized>(&self, rain_risk: u8, rng: &mut R) -> MatchStatus {
        self.simulate_overs(rain_risk, self.config.total_overs, rng)
    }

    /// Simulate a match of `total_overs` per side
    ///
    /// Both rolls are drawn up front on every call. A third draw decides the overs lost
    /// when DLS applies.
    pub fn simulate_overs<R: RandomSource + ?Sized>(
        &self,
        rain_risk: u8,
        total_overs: u32,
        rng: &mut R,
    ) -> MatchStatus {
        let risk = rain_risk.min(100) as f64;
        let abandon_roll = rng.next_unit() * 100.0;
        let dls_roll = rng.next_unit() * 100.0;

        if abandon_roll < risk * self.config.abandonment_factor {
            debug!("Simulated abandonment (roll {:.2}, risk {})", abandon_roll, rain_risk);
            return MatchStatus::abandoned(total_overs);
        }

        if dls_roll < risk {
            let max_overs_lost = (total_overs as f64 * (risk / 100.0)).floor() as u32;
            let overs_lost = (rng.next_unit() * max_overs_lost as f64).floor() as u32;
            let min_overs = self.config.min_overs_for_result.min(total_overs);
            let overs_played = total_overs.saturating_sub(overs_lost).max(min_overs);

            debug!(
                "Simulated DLS: {} of up to {} overs lost, {} played",
                overs_lost, max_overs_lost, overs_played
            );
            return MatchStatus::reduced(total_overs, overs_played);
        }

        MatchStatus::completed(total_overs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator() -> MatchSimulator {
        MatchSimulator::default()
    }

    #[test]
    fn test_abandonment_branch() {
        // abandon roll 10 < 50 * 0.3 = 15
        let status = simulator().simulate(50, &mut ScriptedSource::new([0.10, 0.99]));
        assert_eq!(status, MatchStatus::abandoned(20));
        assert_eq!(status.overs_played, 0);
        assert!(!status.dls_applied);
    }

    #[test]
    fn test_abandonment_threshold_is_strict() {
        // abandon roll exactly 15 is not below 15, dls roll 99 is not below 50
        let status = simulator().simulate(50, &mut ScriptedSource::new([0.15, 0.99]));
        assert_eq!(status, MatchStatus::completed(20));
    }

    #[test]
    fn test_dls_branch_loses_overs() {
        // max lost = floor(20 * 0.5) = 10, lost = floor(0.75 * 10) = 7
        let status = simulator().simulate(50, &mut ScriptedSource::new([0.99, 0.20, 0.75]));
        assert!(status.dls_applied);
        assert!(!status.match_abandoned);
        assert_eq!(status.overs_played, 13);
    }

    #[test]
    fn test_dls_respects_minimum_overs() {
        // max lost = 20, lost = floor(0.999 * 20) = 19, played clamps to 5
        let status = simulator().simulate(100, &mut ScriptedSource::new([0.99, 0.0, 0.999]));
        assert!(status.dls_applied);
        assert_eq!(status.overs_played, 5);
    }

    #[test]
    fn test_completed_branch() {
        let status = simulator().simulate(30, &mut ScriptedSource::new([0.5, 0.5]));
        assert_eq!(status, MatchStatus::completed(20));
    }

    #[test]
    fn test_zero_risk_never_disrupts() {
        let mut rng = SeededSource::new(7);
        for _ in 0..1000 {
            let status = simulator().simulate(0, &mut rng);
            assert_eq!(status, MatchStatus::completed(20));
        }
    }

    #[test]
    fn test_full_risk_always_disrupts() {
        let mut rng = SeededSource::new(11);
        for _ in 0..1000 {
            let status = simulator().simulate(100, &mut rng);
            assert!(status.dls_applied || status.match_abandoned);
        }
    }

    #[test]
    fn test_closure_source() {
        let mut rolls = vec![0.0, 0.0].into_iter();
        let mut source = move || rolls.next().unwrap_or(0.0);
        let status = simulator().simulate(10, &mut source);
        assert!(status.match_abandoned);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = SeededSource::new(42);
        let mut b = SeededSource::new(42);
        for _ in 0..20 {
            assert_eq!(simulator().simulate(60, &mut a), simulator().simulate(60, &mut b));
        }
    }

    #[test]
    fn test_custom_match_length() {
        let status =
            simulator().simulate_overs(100, 50, &mut ScriptedSource::new([0.99, 0.0, 0.5]));
        // max lost 50, lost 25
        assert_eq!(status.total_overs, 50);
        assert_eq!(status.overs_played, 25);
    }
}
