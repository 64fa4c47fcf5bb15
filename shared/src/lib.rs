use serde::{Deserialize, Serialize};
use std::fmt;

/// A lucky-number ticket within a draw cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    /// The lucky number held by this ticket (unique per cycle)
    pub ticket_number: u32,
    /// Draw cycle this ticket belongs to
    pub cycle: u32,
    /// ID of the member who holds this ticket
    pub user_id: String,
    /// Display name of the member (denormalized for admin tables)
    pub user_name: String,
    pub status: TicketStatus,
    /// Who assigned the number
    pub assigned_by: TicketOrigin,
    /// Date of the last confirm/release transition (ISO 8601, YYYY-MM-DD)
    pub assigned_date: Option<String>,
}

/// Lifecycle state of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Soft-held while the payment claim awaits review
    Pending,
    /// Confirmed and eligible for the draw
    Active,
    /// Released; the number is free again
    Void,
}

/// Provenance of a ticket assignment (audit only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketOrigin {
    /// Member picked the number themselves
    User,
    /// Auto-assigned during claim approval
    System,
    /// Manually assigned by an administrator
    Admin,
}

/// The selectable number board for the current cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberBoardResponse {
    pub cycle: u32,
    /// Upper bound of the visible range [1, capacity]
    pub capacity: u32,
    /// Count of active tickets driving the capacity
    pub active_count: u32,
    /// Numbers currently held (pending or active); everything else is free
    pub taken: Vec<TakenNumber>,
}

/// A held slot on the number board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakenNumber {
    pub number: u32,
    pub status: TicketStatus,
    pub user_id: String,
    pub user_name: String,
}

/// Request to soft-hold a specific lucky number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveNumberRequest {
    pub user_id: String,
    pub number: u32,
}

/// Response after a successful reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveNumberResponse {
    pub ticket: Ticket,
    pub success_message: String,
}

/// A member's submitted contribution payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentClaim {
    pub id: String,
    pub user_id: String,
    /// Contribution amount in birr
    pub amount: f64,
    /// Lucky number the member asked for, if any
    pub requested_number: Option<u32>,
    pub cycle: u32,
    pub status: ClaimStatus,
    /// RFC 3339 timestamp of submission
    pub created_at: String,
    /// RFC 3339 timestamp of approval/rejection
    pub processed_at: Option<String>,
}

/// Review state of a payment claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

/// Request to submit a payment claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitClaimRequest {
    pub user_id: String,
    pub amount: f64,
    pub requested_number: Option<u32>,
}

/// Response after submitting a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitClaimResponse {
    pub claim: PaymentClaim,
    pub success_message: String,
}

/// Admin review queue of pending claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingClaimsResponse {
    pub claims: Vec<PaymentClaim>,
}

/// Response after approving a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproveClaimResponse {
    pub claim: PaymentClaim,
    /// The ticket that ended up assigned (confirmed or substituted)
    pub ticket: Ticket,
    /// Present when the requested number was taken and another was substituted
    pub conflict: Option<NumberConflictNotice>,
    pub success_message: String,
}

/// Informational notice that a requested number was substituted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberConflictNotice {
    pub requested_number: u32,
    pub assigned_number: u32,
    pub message: String,
}

/// Response after rejecting a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectClaimResponse {
    pub claim: PaymentClaim,
    pub success_message: String,
}

/// A member of the equb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub status: MemberStatus,
    /// Cumulative contribution credited this cycle, in birr
    pub contribution: f64,
    pub created_at: String, // RFC 3339 timestamp
    pub updated_at: String, // RFC 3339 timestamp
}

/// Verification state of a member within the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// No approved contribution yet this cycle
    Pending,
    /// Contribution approved; holds an active ticket
    Verified,
}

/// Request for registering a new member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
}

/// Response after registering a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberResponse {
    pub member: Member,
    pub success_message: String,
}

/// Response containing all registered members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
}

/// Dashboard view of one member: directory record plus the lucky number
/// derived from the current cycle's ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberOverviewResponse {
    pub member: Member,
    pub cycle: u32,
    pub lucky_number: Option<u32>,
}

/// A calendar date in the Ethiopian calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EthiopianDateDto {
    pub year: i32,
    /// 1-13 (month 13 is the epagomenal Pagume)
    pub month: u32,
    /// 1-30
    pub day: u32,
    /// e.g. "Tir 1, 2016"
    pub display_en: String,
    /// e.g. "ጥር 1, 2016"
    pub display_am: String,
}

/// Current draw schedule shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawScheduleResponse {
    pub cycle: u32,
    /// Gregorian draw date (ISO 8601, YYYY-MM-DD)
    pub draw_date: String,
    pub draw_date_ethiopian: EthiopianDateDto,
    /// Whole days until the draw (negative once the date has passed)
    pub days_remaining: i64,
}

/// Response after closing the cycle and opening the next one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceCycleResponse {
    pub cycle: u32,
    pub draw_date: String,
    pub draw_date_ethiopian: EthiopianDateDto,
    /// How many member records were reset for the new cycle
    pub members_reset: usize,
    pub success_message: String,
}

impl Member {
    /// Generate a member ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("member::{}", epoch_millis)
    }

    /// Parse a member ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, MemberIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 2 || parts[0] != "member" {
            return Err(MemberIdError::InvalidFormat);
        }

        parts[1].parse::<u64>().map_err(|_| MemberIdError::InvalidTimestamp)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for MemberIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberIdError::InvalidFormat => write!(f, "Invalid member ID format"),
            MemberIdError::InvalidTimestamp => write!(f, "Invalid timestamp in member ID"),
        }
    }
}

impl std::error::Error for MemberIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_member_id() {
        let member_id = Member::generate_id(1702516122000);
        assert_eq!(member_id, "member::1702516122000");
    }

    #[test]
    fn test_parse_member_id() {
        let timestamp = Member::parse_id("member::1702516122000").unwrap();
        assert_eq!(timestamp, 1702516122000);

        assert!(Member::parse_id("invalid::format").is_err());
        assert!(Member::parse_id("member").is_err());
        assert!(Member::parse_id("not_member::123").is_err());
        assert!(Member::parse_id("member::not_a_number").is_err());
    }

    #[test]
    fn test_ticket_status_serializes_as_variant_name() {
        let json = serde_json::to_string(&TicketStatus::Active).unwrap();
        assert_eq!(json, "\"Active\"");
        let back: TicketStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TicketStatus::Active);
    }
}
