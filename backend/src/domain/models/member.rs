//! Domain model for an equb member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verification state of a member within the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// No approved contribution yet this cycle
    Pending,
    /// Contribution approved this cycle
    Verified,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "pending",
            MemberStatus::Verified => "verified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MemberStatus::Pending),
            "verified" => Some(MemberStatus::Verified),
            _ => None,
        }
    }
}

/// A registered member. The member's lucky number is not stored here; it is
/// derived from the ticket ledger for the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub status: MemberStatus,
    /// Cumulative contribution credited this cycle, in birr.
    pub contribution: f64,
    /// Last cycle this record was reset for. Lets a crashed rollover resume
    /// without double-resetting anyone.
    pub last_reset_cycle: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Generate a member ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("member::{}", epoch_millis)
    }
}
