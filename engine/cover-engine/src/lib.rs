//! Match Day Cover engine
//!
//! Prices parametric rain cover for T20 matches and settles it against a simulated
//! match outcome. Everything in this crate is synchronous and side-effect free apart
//! from the random source handed to the simulator; the forecast fetch and the
//! preference store live in their own crates.

pub mod advisor;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod payout;
pub mod policy;
pub mod pricing;
pub mod risk;
pub mod session;
pub mod simulator;
pub mod tiers;

#[cfg(test)]
mod tests;

pub use advisor::{ExpectedValue, Recommendation, RecommendationAdvisor, ValueProposition};
pub use catalog::{find_stadium, stadiums};
pub use config::EngineConfig;
pub use error::{EngineError, SessionError};
pub use models::*;
pub use payout::{DlsResult, PayoutEngine, PayoutTier, SettlementContext};
pub use policy::Policy;
pub use pricing::{PremiumBreakdown, PricingEngine};
pub use risk::RiskAssessor;
pub use session::{Achievement, MatchDaySession, PurchaseRequest};
pub use simulator::{MatchSimulator, RandomSource, ScriptedSource, SeededSource, ThreadRngSource};
pub use tiers::{
    find_tier, tiers, ComponentCondition, CoverageAmount, CoverageComponent, CoverageKind,
    InsuranceTier, ScenarioTag, SettlementMode, TierId,
};

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// T20 match length in overs per side
pub const DEFAULT_TOTAL_OVERS: u32 = 20;

/// Minimum overs per side for a match to count as a result
pub const MIN_OVERS_FOR_RESULT: u32 = 5;

/// Number of hourly forecast entries treated as the match window
pub const CRITICAL_HOURS: usize = 6;
