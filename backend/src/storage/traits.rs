//! # Storage Traits
//!
//! Storage abstractions for the equb core. The domain layer talks to these
//! traits only; the concrete backend (CSV files today, a database tomorrow)
//! is interchangeable underneath.
//!
//! The ticket trait deliberately exposes compound primitives
//! (`create_ticket_if_free`, `create_ticket_at_next_available`,
//! `confirm_if_pending`) rather than bare get/put: the check and the write
//! must happen inside one critical section so that two racing callers can
//! never both claim the same (cycle, number) slot.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::models::draw_settings::DrawSettings;
use crate::domain::models::member::Member;
use crate::domain::models::payment_claim::{ClaimStatus, PaymentClaim};
use crate::domain::models::ticket::{AssignedBy, Ticket, TicketState};

/// Trait defining the interface for ticket ledger storage operations
pub trait TicketStorage: Send + Sync {
    /// Atomically create `ticket` unless a pending/active ticket already
    /// holds its (cycle, number) slot. Returns the stored ticket, or `None`
    /// when the slot was taken.
    fn create_ticket_if_free(&self, ticket: &Ticket) -> Result<Option<Ticket>>;

    /// Atomically find the smallest free number in `cycle` and create a
    /// ticket there in the given state. The scan and the insert share one
    /// critical section.
    fn create_ticket_at_next_available(
        &self,
        cycle: u32,
        owner_id: &str,
        owner_name: &str,
        state: TicketState,
        assigned_by: AssignedBy,
        assigned_date: Option<NaiveDate>,
    ) -> Result<Ticket>;

    /// Retrieve a ticket by ID within a cycle
    fn get_ticket(&self, cycle: u32, ticket_id: &str) -> Result<Option<Ticket>>;

    /// The pending/active ticket currently holding `(cycle, number)`, if any.
    /// Void tickets are never returned.
    fn find_holder(&self, cycle: u32, number: u32) -> Result<Option<Ticket>>;

    /// List every ticket recorded for a cycle, void ones included
    fn list_tickets(&self, cycle: u32) -> Result<Vec<Ticket>>;

    /// Atomically transition a pending ticket to active, stamping the
    /// assignment provenance and date. Returns `None` when the ticket does
    /// not exist or is not pending.
    fn confirm_if_pending(
        &self,
        cycle: u32,
        ticket_id: &str,
        assigned_by: AssignedBy,
        assigned_date: NaiveDate,
    ) -> Result<Option<Ticket>>;

    /// Transition a ticket to void, freeing its number. Idempotent: voiding
    /// a void ticket returns it unchanged. Returns `None` when the ticket
    /// does not exist.
    fn release_ticket(
        &self,
        cycle: u32,
        ticket_id: &str,
        assigned_date: NaiveDate,
    ) -> Result<Option<Ticket>>;

    /// Smallest number with no pending/active ticket in `cycle`. Linear scan
    /// from 1; deterministic.
    fn next_available_number(&self, cycle: u32) -> Result<u32>;

    /// Count of active tickets in `cycle`; feeds the capacity computation.
    fn active_count_for_cycle(&self, cycle: u32) -> Result<u32>;

    /// The member's active ticket in `cycle`, if any. At most one exists.
    fn find_active_ticket(&self, cycle: u32, member_id: &str) -> Result<Option<Ticket>>;
}

/// Trait defining the interface for member directory storage operations
pub trait MemberStorage: Send + Sync {
    /// Store a new member
    fn store_member(&self, member: &Member) -> Result<()>;

    /// Retrieve a specific member by ID
    fn get_member(&self, member_id: &str) -> Result<Option<Member>>;

    /// List all members ordered by name
    fn list_members(&self) -> Result<Vec<Member>>;

    /// Update an existing member
    fn update_member(&self, member: &Member) -> Result<()>;

    /// Atomically mark a member verified and add `amount` to their
    /// contribution. Returns the updated member, or `None` if unknown.
    fn apply_contribution(&self, member_id: &str, amount: f64) -> Result<Option<Member>>;

    /// Reset every member whose `last_reset_cycle` is behind `cycle` back to
    /// pending with zero contribution, stamping `last_reset_cycle = cycle`,
    /// in a single write. Idempotent; returns how many records changed.
    fn reset_members_behind(&self, cycle: u32) -> Result<usize>;
}

/// Outcome of a claim's terminal transition attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimTransition {
    /// The claim was pending and has now moved to the requested status.
    Applied(PaymentClaim),
    /// The claim had already reached a terminal status; nothing changed.
    AlreadyProcessed(PaymentClaim),
    /// No claim with that ID exists.
    NotFound,
}

/// Trait defining the interface for payment claim storage operations
pub trait ClaimStorage: Send + Sync {
    /// Store a new claim
    fn store_claim(&self, claim: &PaymentClaim) -> Result<()>;

    /// Retrieve a specific claim by ID
    fn get_claim(&self, claim_id: &str) -> Result<Option<PaymentClaim>>;

    /// List claims with the given status, oldest first (admin review queue)
    fn list_claims_by_status(&self, status: ClaimStatus) -> Result<Vec<PaymentClaim>>;

    /// Atomically move a pending claim to a terminal status. The status
    /// check and the write share one critical section, so racing reviewers
    /// observe `AlreadyProcessed` instead of interleaving.
    fn transition_claim_if_pending(
        &self,
        claim_id: &str,
        to: ClaimStatus,
        processed_at: DateTime<Utc>,
    ) -> Result<ClaimTransition>;
}

/// Trait defining the interface for draw settings storage operations
pub trait SettingsStorage: Send + Sync {
    /// The current settings record. Bootstraps and persists a cycle-1
    /// default when the store is empty.
    fn get_settings(&self) -> Result<DrawSettings>;

    /// Persist `settings` with a bumped version; returns the stored record.
    fn store_settings(&self, settings: &DrawSettings) -> Result<DrawSettings>;
}
