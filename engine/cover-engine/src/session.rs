//! Match day session: wallet, active policy, and achievements
//!
//! A session holds at most one policy. Purchase deducts the premium and freezes the
//! quote; settlement simulates the match, credits the payout, and clears the policy.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::info;

use crate::error::SessionError;
use crate::models::{SettlementResult, Stadium};
use crate::payout::{PayoutEngine, SettlementContext};
use crate::policy::Policy;
use crate::simulator::{MatchSimulator, RandomSource};
use crate::tiers::{find_tier, TierId};

/// Wallet balance for a new session, in rupees
pub const DEFAULT_WALLET: i64 = 25_000;

const HIGH_ROLLER_TICKET: i64 = 10_000;
const BIG_CLAIM_PAYOUT: i64 = 10_000;
const RISK_TAKER_MAX_RISK: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstPolicy,
    HighRoller,
    BigClaim,
    RiskTaker,
}

impl Achievement {
    pub fn as_str(self) -> &'static str {
        match self {
            Achievement::FirstPolicy => "first_policy",
            Achievement::HighRoller => "high_roller",
            Achievement::BigClaim => "big_claim",
            Achievement::RiskTaker => "risk_taker",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstPolicy => "First Policy",
            Achievement::HighRoller => "High Roller",
            Achievement::BigClaim => "Big Claim",
            Achievement::RiskTaker => "Risk Taker",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to buy a policy
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub tier: TierId,
    pub ticket_value: i64,
    pub premium: i64,
    pub stadium: Stadium,
    pub rain_risk: u8,
    pub is_outstation: bool,
    pub total_investment: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDaySession {
    wallet: i64,
    policy: Option<Policy>,
    achievements: BTreeSet<Achievement>,
    total_premiums: i64,
    total_payouts: i64,
}

impl Default for MatchDaySession {
    fn default() -> Self {
        Self::new(DEFAULT_WALLET)
    }
}

impl MatchDaySession {
    pub fn new(wallet: i64) -> Self {
        Self {
            wallet,
            policy: None,
            achievements: BTreeSet::new(),
            total_premiums: 0,
            total_payouts: 0,
        }
    }

    /// Restore a session from persisted wallet and achievements
    pub fn restore(wallet: i64, achievements: impl IntoIterator<Item = Achievement>) -> Self {
        Self { achievements: achievements.into_iter().collect(), ..Self::new(wallet) }
    }

    pub fn wallet(&self) -> i64 {
        self.wallet
    }

    pub fn policy(&self) -> Option<&Policy> {
        self.policy.as_ref()
    }

    pub fn achievements(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.achievements.iter().copied()
    }

    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }

    /// Payouts received minus premiums paid this session
    pub fn profit_loss(&self) -> i64 {
        self.total_payouts - self.total_premiums
    }

    pub fn can_afford(&self, premium: i64) -> bool {
        premium <= self.wallet
    }

    /// Buy a policy, deducting the premium from the wallet
    ///
    /// Returns the newly unlocked achievements alongside the policy.
    pub fn purchase(
        &mut self,
        request: PurchaseRequest,
    ) -> Result<(&Policy, Vec<Achievement>), SessionError> {
        if let Some(active) = &self.policy {
            return Err(SessionError::PolicyAlreadyActive { tier: active.tier });
        }
        if request.ticket_value <= 0 {
            return Err(SessionError::InvalidTicketValue { ticket_value: request.ticket_value });
        }
        if !self.can_afford(request.premium) {
            return Err(SessionError::InsufficientFunds {
                premium: request.premium,
                wallet: self.wallet,
            });
        }

        self.wallet -= request.premium;
        self.total_premiums += request.premium;

        let mut unlocked = Vec::new();
        self.unlock(Achievement::FirstPolicy, &mut unlocked);
        if request.ticket_value >= HIGH_ROLLER_TICKET {
            self.unlock(Achievement::HighRoller, &mut unlocked);
        }

        info!(
            "Purchased {} cover at {} for ticket {}: premium {}, wallet now {}",
            request.tier, request.stadium.id, request.ticket_value, request.premium, self.wallet
        );

        let policy = self.policy.insert(Policy {
            tier: request.tier,
            ticket_value: request.ticket_value,
            premium: request.premium,
            stadium: request.stadium,
            rain_risk: request.rain_risk,
            purchase_time: Utc::now(),
            is_outstation: request.is_outstation,
            total_investment: request.total_investment,
        });
        Ok((&*policy, unlocked))
    }

    /// Simulate the match for the active policy and credit the payout
    pub fn settle<R: RandomSource + ?Sized>(
        &mut self,
        simulator: &MatchSimulator,
        rng: &mut R,
        attends_rescheduled: bool,
    ) -> Result<(SettlementResult, Vec<Achievement>), SessionError> {
        let policy = self.policy.take().ok_or(SessionError::NoActivePolicy)?;

        let status = simulator.simulate(policy.rain_risk, rng);
        let context =
            SettlementContext { is_outstation: policy.is_outstation, attends_rescheduled };
        let result =
            PayoutEngine::settle_match(find_tier(policy.tier), policy.ticket_value, &status, &context);

        self.wallet += result.payout;
        self.total_payouts += result.payout;

        let mut unlocked = Vec::new();
        if result.payout >= BIG_CLAIM_PAYOUT {
            self.unlock(Achievement::BigClaim, &mut unlocked);
        }
        if policy.rain_risk < RISK_TAKER_MAX_RISK {
            self.unlock(Achievement::RiskTaker, &mut unlocked);
        }

        info!(
            "Match at {} settled: payout {}, net {}, wallet now {}",
            policy.stadium.id,
            result.payout,
            policy.net_return(result.payout),
            self.wallet
        );
        Ok((result, unlocked))
    }

    /// Drop the active policy without settling. The premium is not refunded.
    pub fn reset(&mut self) {
        if let Some(policy) = self.policy.take() {
            info!("Discarded {} policy without settlement", policy.tier);
        }
    }

    fn unlock(&mut self, achievement: Achievement, unlocked: &mut Vec<Achievement>) {
        if self.achievements.insert(achievement) {
            info!("Achievement unlocked: {}", achievement.title());
            unlocked.push(achievement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_stadium;
    use crate::simulator::ScriptedSource;

    fn request(tier: TierId, ticket_value: i64, premium: i64, rain_risk: u8) -> PurchaseRequest {
        PurchaseRequest {
            tier,
            ticket_value,
            premium,
            stadium: find_stadium("mum").unwrap().clone(),
            rain_risk,
            is_outstation: false,
            total_investment: ticket_value,
        }
    }

    #[test]
    fn test_purchase_deducts_premium_and_unlocks_first_policy() {
        let mut session = MatchDaySession::default();
        let (policy, unlocked) = session.purchase(request(TierId::Standard, 2500, 199, 40)).unwrap();
        assert_eq!(policy.premium, 199);
        assert_eq!(unlocked, vec![Achievement::FirstPolicy]);
        assert_eq!(session.wallet(), 25_000 - 199);
        assert_eq!(session.profit_loss(), -199);
    }

    #[test]
    fn test_high_roller() {
        let mut session = MatchDaySession::default();
        let (_, unlocked) = session.purchase(request(TierId::Premium, 10_000, 2500, 40)).unwrap();
        assert!(unlocked.contains(&Achievement::HighRoller));
    }

    #[test]
    fn test_insufficient_funds() {
        let mut session = MatchDaySession::new(100);
        assert!(!session.can_afford(199));
        let err = session.purchase(request(TierId::Standard, 2500, 199, 40)).unwrap_err();
        assert_eq!(err, SessionError::InsufficientFunds { premium: 199, wallet: 100 });
        assert_eq!(session.wallet(), 100);
        assert!(session.policy().is_none());
    }

    #[test]
    fn test_only_one_active_policy() {
        let mut session = MatchDaySession::default();
        session.purchase(request(TierId::Basic, 1000, 99, 10)).unwrap();
        let err = session.purchase(request(TierId::Basic, 1000, 99, 10)).unwrap_err();
        assert_eq!(err, SessionError::PolicyAlreadyActive { tier: TierId::Basic });
    }

    #[test]
    fn test_rejects_non_positive_ticket() {
        let mut session = MatchDaySession::default();
        let err = session.purchase(request(TierId::Basic, 0, 99, 10)).unwrap_err();
        assert_eq!(err, SessionError::InvalidTicketValue { ticket_value: 0 });
    }

    #[test]
    fn test_settle_without_policy() {
        let mut session = MatchDaySession::default();
        let err = session
            .settle(&MatchSimulator::default(), &mut ScriptedSource::new([0.5]), false)
            .unwrap_err();
        assert_eq!(err, SessionError::NoActivePolicy);
    }

    #[test]
    fn test_abandoned_match_pays_and_clears_policy() {
        let mut session = MatchDaySession::default();
        session.purchase(request(TierId::Basic, 12_000, 500, 80)).unwrap();

        // abandon roll 0 < 80 * 0.3
        let (result, unlocked) = session
            .settle(&MatchSimulator::default(), &mut ScriptedSource::new([0.0, 0.0]), false)
            .unwrap();

        assert!(result.abandoned);
        assert_eq!(result.payout, 12_000);
        assert!(session.policy().is_none());
        assert_eq!(session.wallet(), 25_000 - 500 + 12_000);
        assert_eq!(session.profit_loss(), 11_500);
        assert_eq!(unlocked, vec![Achievement::BigClaim]);
    }

    #[test]
    fn test_low_risk_settlement_unlocks_risk_taker() {
        let mut session = MatchDaySession::default();
        session.purchase(request(TierId::Basic, 1000, 99, 10)).unwrap();

        let (result, unlocked) = session
            .settle(&MatchSimulator::default(), &mut ScriptedSource::new([0.99, 0.99]), false)
            .unwrap();

        assert_eq!(result.payout, 0);
        assert_eq!(unlocked, vec![Achievement::RiskTaker]);
        assert_eq!(session.wallet(), 25_000 - 99);
    }

    #[test]
    fn test_achievements_unlock_once() {
        let mut session = MatchDaySession::default();
        session.purchase(request(TierId::Basic, 1000, 99, 10)).unwrap();
        session.reset();
        let (_, unlocked) = session.purchase(request(TierId::Basic, 1000, 99, 10)).unwrap();
        assert!(unlocked.is_empty());
        assert!(session.has_achievement(Achievement::FirstPolicy));
    }

    #[test]
    fn test_reset_keeps_premium_spent() {
        let mut session = MatchDaySession::default();
        session.purchase(request(TierId::Basic, 1000, 99, 10)).unwrap();
        session.reset();
        assert!(session.policy().is_none());
        assert_eq!(session.wallet(), 25_000 - 99);
    }

    #[test]
    fn test_restore() {
        let session = MatchDaySession::restore(5000, [Achievement::BigClaim]);
        assert_eq!(session.wallet(), 5000);
        assert!(session.has_achievement(Achievement::BigClaim));
        assert_eq!(session.profit_loss(), 0);
    }

    #[test]
    fn test_achievement_serde_names() {
        let json = serde_json::to_string(&Achievement::FirstPolicy).unwrap();
        assert_eq!(json, "\"first_policy\"");
    }
}
