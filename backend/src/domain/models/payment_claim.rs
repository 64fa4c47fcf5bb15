//! Domain model for a contribution payment claim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review state of a claim. `Approved` and `Rejected` are terminal; a claim
/// is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ClaimStatus::Pending),
            "approved" => Some(ClaimStatus::Approved),
            "rejected" => Some(ClaimStatus::Rejected),
            _ => None,
        }
    }
}

/// A member's record of a contribution payment, optionally asking for a
/// specific lucky number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentClaim {
    pub id: String,
    pub member_id: String,
    /// Contribution amount in birr.
    pub amount: f64,
    pub requested_number: Option<u32>,
    /// Cycle the claim was submitted in.
    pub cycle: u32,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl PaymentClaim {
    /// Generate a unique claim ID.
    /// Format: claim-<epoch_millis>-<uuid fragment>
    pub fn generate_id(epoch_millis: u64) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("claim-{}-{}", epoch_millis, &suffix[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!ClaimStatus::Pending.is_terminal());
        assert!(ClaimStatus::Approved.is_terminal());
        assert!(ClaimStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [ClaimStatus::Pending, ClaimStatus::Approved, ClaimStatus::Rejected] {
            assert_eq!(ClaimStatus::parse(status.as_str()), Some(status));
        }
    }
}
