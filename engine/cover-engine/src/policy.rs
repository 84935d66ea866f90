//! Purchased cover

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Stadium;
use crate::tiers::TierId;

/// A purchased policy
///
/// Premium, stadium and rain risk are snapshots taken at purchase time and never repriced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub tier: TierId,
    pub ticket_value: i64,
    pub premium: i64,
    pub stadium: Stadium,
    pub rain_risk: u8,
    pub purchase_time: DateTime<Utc>,
    pub is_outstation: bool,
    /// Ticket plus travel and stay spend, used for value-for-money copy
    pub total_investment: i64,
}

impl Policy {
    /// Net cost of the policy to the holder for a given payout
    pub fn net_return(&self, payout: i64) -> i64 {
        payout - self.premium
    }
}
