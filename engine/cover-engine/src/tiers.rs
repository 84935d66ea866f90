//! Insurance tier catalog
//!
//! Tiers carry their coverage as data: each component declares the settlement scenarios
//! that activate it, so settlement never has to interpret trigger text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::EngineError;

/// Tier identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierId {
    Basic,
    Standard,
    Premium,
    Group,
}

impl TierId {
    pub const ALL: [TierId; 4] = [TierId::Basic, TierId::Standard, TierId::Premium, TierId::Group];

    pub fn as_str(self) -> &'static str {
        match self {
            TierId::Basic => "basic",
            TierId::Standard => "standard",
            TierId::Premium => "premium",
            TierId::Group => "group",
        }
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(TierId::Basic),
            "standard" => Ok(TierId::Standard),
            "premium" => Ok(TierId::Premium),
            "group" => Ok(TierId::Group),
            _ => Err(EngineError::UnknownTier { tier_id: s.to_string() }),
        }
    }
}

/// Settlement scenario a coverage component can be triggered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioTag {
    /// Match washed out (or fewer than a quarter of the overs bowled)
    Abandoned,
    /// DLS applied, 10-25% of overs lost
    Minor,
    /// DLS applied, 26-50% of overs lost
    Significant,
    /// DLS applied, more than 50% of overs lost
    Severe,
}

impl ScenarioTag {
    pub const ALL: [ScenarioTag; 4] =
        [ScenarioTag::Abandoned, ScenarioTag::Severe, ScenarioTag::Significant, ScenarioTag::Minor];

    /// Share of the ticket refunded for this scenario
    pub fn payout_multiplier(self) -> f64 {
        match self {
            ScenarioTag::Abandoned | ScenarioTag::Severe => 1.0,
            ScenarioTag::Significant => 0.5,
            ScenarioTag::Minor => 0.25,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioTag::Abandoned => "abandoned",
            ScenarioTag::Minor => "minor",
            ScenarioTag::Significant => "significant",
            ScenarioTag::Severe => "severe",
        }
    }
}

impl fmt::Display for ScenarioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a component pays, as a function of the ticket value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageAmount {
    TicketFraction(f64),
    Fixed(i64),
}

impl CoverageAmount {
    pub fn amount(self, ticket_value: i64) -> f64 {
        match self {
            CoverageAmount::TicketFraction(fraction) => ticket_value as f64 * fraction,
            CoverageAmount::Fixed(amount) => amount as f64,
        }
    }
}

/// Extra condition a component needs on top of its trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCondition {
    Always,
    /// Only for fans who travelled to the venue city
    Outstation,
    /// Only when the fan attends the rescheduled fixture
    AttendsRescheduled,
}

/// Kind of benefit, used to compare coverage across tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageKind {
    TicketRefund,
    SevereRefund,
    TravelAllowance,
    InconvenienceBenefit,
    SignificantRefund,
    MinorRefund,
    Accommodation,
    StrandedVoucher,
    RainCheckBonus,
    MerchandiseVoucher,
}

/// One independently triggered payout within a tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageComponent {
    pub kind: CoverageKind,
    pub name: String,
    pub triggers: BTreeSet<ScenarioTag>,
    /// Pays on every DLS scenario, but not on an outright abandonment
    pub applies_on_any_dls: bool,
    pub condition: ComponentCondition,
    pub amount: CoverageAmount,
    pub description: String,
}

impl CoverageComponent {
    fn new(
        kind: CoverageKind,
        name: &str,
        triggers: &[ScenarioTag],
        amount: CoverageAmount,
        description: &str,
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            triggers: triggers.iter().copied().collect(),
            applies_on_any_dls: false,
            condition: ComponentCondition::Always,
            amount,
            description: description.to_string(),
        }
    }

    fn any_dls(kind: CoverageKind, name: &str, amount: CoverageAmount, description: &str) -> Self {
        Self { applies_on_any_dls: true, ..Self::new(kind, name, &[], amount, description) }
    }

    fn when(mut self, condition: ComponentCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Whether this component fires for the scenario, ignoring its condition
    pub fn is_triggered_by(&self, scenario: ScenarioTag) -> bool {
        self.triggers.contains(&scenario)
            || (self.applies_on_any_dls && scenario != ScenarioTag::Abandoned)
    }
}

/// How a tier turns a scenario into money
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    /// Sum every triggered coverage component
    ComponentSum,
    /// `ticket * scenario multiplier * factor`, e.g. 1.2 for "120% refund if washed out"
    FlatMultiplier { factor: f64 },
}

/// A named insurance product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceTier {
    pub id: TierId,
    pub name: String,
    /// Display price before dynamic pricing
    pub price: i64,
    pub tagline: String,
    pub recommended: bool,
    pub components: Vec<CoverageComponent>,
    pub features: Vec<String>,
    pub settlement_mode: SettlementMode,
}

impl InsuranceTier {
    pub fn with_settlement_mode(mut self, settlement_mode: SettlementMode) -> Self {
        self.settlement_mode = settlement_mode;
        self
    }

    pub fn coverage_kinds(&self) -> BTreeSet<CoverageKind> {
        self.components.iter().map(|c| c.kind).collect()
    }
}

static TIERS: OnceLock<Vec<InsuranceTier>> = OnceLock::new();

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn ticket_refund() -> CoverageComponent {
    CoverageComponent::new(
        CoverageKind::TicketRefund,
        "Ticket Value Refund",
        &[ScenarioTag::Abandoned],
        CoverageAmount::TicketFraction(1.0),
        "100% ticket refund if match is abandoned",
    )
}

fn severe_refund() -> CoverageComponent {
    CoverageComponent::new(
        CoverageKind::SevereRefund,
        "Partial Refund",
        &[ScenarioTag::Severe],
        CoverageAmount::TicketFraction(0.5),
        "50% refund if DLS reduces the match by more than half",
    )
}

fn travel_allowance(amount: i64) -> CoverageComponent {
    CoverageComponent::new(
        CoverageKind::TravelAllowance,
        "Travel Allowance",
        &[ScenarioTag::Abandoned],
        CoverageAmount::Fixed(amount),
        "Fixed allowance for wasted travel costs",
    )
}

fn inconvenience_benefit() -> CoverageComponent {
    CoverageComponent::any_dls(
        CoverageKind::InconvenienceBenefit,
        "Inconvenience Benefit",
        CoverageAmount::Fixed(250),
        "Compensation whenever DLS is applied, even if the match completes",
    )
}

fn significant_refund() -> CoverageComponent {
    CoverageComponent::new(
        CoverageKind::SignificantRefund,
        "Significant Disruption",
        &[ScenarioTag::Significant],
        CoverageAmount::TicketFraction(0.5),
        "50% refund when 26-50% of overs are lost",
    )
}

fn minor_refund() -> CoverageComponent {
    CoverageComponent::new(
        CoverageKind::MinorRefund,
        "Minor Disruption",
        &[ScenarioTag::Minor],
        CoverageAmount::TicketFraction(0.25),
        "25% refund when 10-25% of overs are lost",
    )
}

fn basic_cover() -> InsuranceTier {
    InsuranceTier {
        id: TierId::Basic,
        name: "Dost Plan (Basic)".to_string(),
        price: 99,
        tagline: "Simple ticket refund protection".to_string(),
        recommended: false,
        components: vec![ticket_refund(), severe_refund()],
        features: features(&[
            "100% ticket refund if match abandoned",
            "50% refund if DLS reduces match by >50%",
            "Same-day claims processing",
            "Automatic payout verification",
        ]),
        settlement_mode: SettlementMode::ComponentSum,
    }
}

fn standard_cover() -> InsuranceTier {
    InsuranceTier {
        id: TierId::Standard,
        name: "VIP Tier (Standard)".to_string(),
        price: 199,
        tagline: "Comprehensive match day protection".to_string(),
        recommended: true,
        components: vec![
            ticket_refund(),
            severe_refund(),
            travel_allowance(750),
            inconvenience_benefit(),
            significant_refund(),
            minor_refund(),
        ],
        features: features(&[
            "Everything in Basic Cover",
            "Travel allowance (₹750) if match abandoned",
            "Inconvenience benefit (₹250) for ANY DLS application",
            "25% refund if DLS reduces match by 10-25%",
            "50% refund if DLS reduces match by 26-50%",
            "Priority claims processing",
        ]),
        settlement_mode: SettlementMode::ComponentSum,
    }
}

fn premium_cover() -> InsuranceTier {
    InsuranceTier {
        id: TierId::Premium,
        name: "Diamond Haath (Premium)".to_string(),
        price: 499,
        tagline: "Ultimate protection for travelling supporters".to_string(),
        recommended: false,
        components: vec![
            ticket_refund(),
            severe_refund(),
            travel_allowance(1000),
            inconvenience_benefit(),
            significant_refund(),
            minor_refund(),
            CoverageComponent::new(
                CoverageKind::Accommodation,
                "Accommodation Cover",
                &[ScenarioTag::Abandoned],
                CoverageAmount::Fixed(3000),
                "Up to ₹3000 for hotel bookings",
            )
            .when(ComponentCondition::Outstation),
            CoverageComponent::new(
                CoverageKind::StrandedVoucher,
                "Stadium Stranded Cover",
                &[ScenarioTag::Significant, ScenarioTag::Severe, ScenarioTag::Abandoned],
                CoverageAmount::Fixed(300),
                "F&B voucher for long rain delays",
            ),
            CoverageComponent::new(
                CoverageKind::RainCheckBonus,
                "Rain Check Bonus",
                &[ScenarioTag::Abandoned],
                CoverageAmount::Fixed(500),
                "Loyalty reward for attending the rescheduled match",
            )
            .when(ComponentCondition::AttendsRescheduled),
        ],
        features: features(&[
            "Everything in Standard Cover",
            "Accommodation cover (up to ₹3,000) for outstation fans",
            "Stadium stranded F&B voucher (₹300) for long delays",
            "Rain check rebooking bonus (₹500) if attending rescheduled match",
            "Enhanced travel allowance (₹1,000)",
            "VIP claims processing",
        ]),
        settlement_mode: SettlementMode::ComponentSum,
    }
}

fn group_cover() -> InsuranceTier {
    InsuranceTier {
        id: TierId::Group,
        name: "Squad Goals (Group)".to_string(),
        price: 1499,
        tagline: "One policy for up to 5 people".to_string(),
        recommended: false,
        components: vec![
            CoverageComponent::new(
                CoverageKind::TicketRefund,
                "Group Ticket Refund",
                &[ScenarioTag::Abandoned],
                CoverageAmount::TicketFraction(5.0),
                "100% refund for all group tickets",
            ),
            CoverageComponent::new(
                CoverageKind::TravelAllowance,
                "Group Travel Allowance",
                &[ScenarioTag::Abandoned],
                CoverageAmount::Fixed(2000),
                "Shared travel reimbursement",
            ),
            CoverageComponent::new(
                CoverageKind::Accommodation,
                "Group Accommodation",
                &[ScenarioTag::Abandoned],
                CoverageAmount::Fixed(5000),
                "Enhanced accommodation cover for groups",
            )
            .when(ComponentCondition::Outstation),
            CoverageComponent::any_dls(
                CoverageKind::MerchandiseVoucher,
                "Stadium Merchandise Voucher",
                CoverageAmount::Fixed(500),
                "Group shopping voucher",
            ),
        ],
        features: features(&[
            "All Premium benefits for up to 5 people",
            "Shared travel allowance (₹2,000)",
            "Group accommodation cover (₹5,000)",
            "Single policy for easy management",
        ]),
        settlement_mode: SettlementMode::ComponentSum,
    }
}

/// The tier catalog, cheapest first
pub fn tiers() -> &'static [InsuranceTier] {
    TIERS.get_or_init(|| vec![basic_cover(), standard_cover(), premium_cover(), group_cover()])
}

pub fn find_tier(id: TierId) -> &'static InsuranceTier {
    // Every TierId has exactly one catalog entry.
    match id {
        TierId::Basic => &tiers()[0],
        TierId::Standard => &tiers()[1],
        TierId::Premium => &tiers()[2],
        TierId::Group => &tiers()[3],
    }
}
