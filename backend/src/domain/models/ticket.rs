//! Domain model for a lucky-number ticket.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a ticket within its cycle.
///
/// `Pending` and `Active` tickets hold their number; `Void` tickets are
/// terminal and never block allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketState {
    Pending,
    Active,
    Void,
}

impl TicketState {
    /// True while the ticket occupies its (cycle, number) slot.
    pub fn holds_number(&self) -> bool {
        matches!(self, TicketState::Pending | TicketState::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::Pending => "pending",
            TicketState::Active => "active",
            TicketState::Void => "void",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TicketState::Pending),
            "active" => Some(TicketState::Active),
            "void" => Some(TicketState::Void),
            _ => None,
        }
    }
}

/// Who assigned the ticket's number. Audit information only; has no effect
/// on allocation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignedBy {
    /// Member self-selected the number
    User,
    /// Auto-assigned during claim approval
    System,
    /// Manually assigned by an administrator
    Admin,
}

impl AssignedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignedBy::User => "user",
            AssignedBy::System => "system",
            AssignedBy::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(AssignedBy::User),
            "system" => Some(AssignedBy::System),
            "admin" => Some(AssignedBy::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    /// The lucky number. Unique per cycle among pending/active tickets.
    pub number: u32,
    /// Cycle the ticket belongs to. Immutable once created.
    pub cycle: u32,
    pub owner_id: String,
    pub owner_name: String,
    pub state: TicketState,
    pub assigned_by: AssignedBy,
    /// Date of the confirm/release transition; empty while pending.
    pub assigned_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Generate a unique ticket ID.
    /// Format: ticket-<epoch_millis>-<uuid fragment>
    pub fn generate_id(epoch_millis: u64) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("ticket-{}-{}", epoch_millis, &suffix[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holds_number() {
        assert!(TicketState::Pending.holds_number());
        assert!(TicketState::Active.holds_number());
        assert!(!TicketState::Void.holds_number());
    }

    #[test]
    fn test_state_round_trips_through_str() {
        for state in [TicketState::Pending, TicketState::Active, TicketState::Void] {
            assert_eq!(TicketState::parse(state.as_str()), Some(state));
        }
        assert_eq!(TicketState::parse("garbage"), None);
    }

    #[test]
    fn test_generate_id_is_unique() {
        let a = Ticket::generate_id(1702516122000);
        let b = Ticket::generate_id(1702516122000);
        assert!(a.starts_with("ticket-1702516122000-"));
        assert_ne!(a, b);
    }
}
