//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to and from these internal types.

pub mod tickets {
    use crate::domain::models::ticket::Ticket;

    /// Input for soft-holding a specific lucky number.
    #[derive(Debug, Clone)]
    pub struct ReserveNumberCommand {
        pub cycle: u32,
        pub number: u32,
        pub member_id: String,
    }

    /// Snapshot of the selectable number board for one cycle.
    #[derive(Debug, Clone)]
    pub struct NumberBoardResult {
        pub cycle: u32,
        /// Upper bound of the visible range [1, capacity].
        pub capacity: u32,
        pub active_count: u32,
        /// Pending/active tickets, ordered by number.
        pub taken: Vec<Ticket>,
    }
}

pub mod claims {
    use crate::domain::models::payment_claim::PaymentClaim;
    use crate::domain::models::ticket::Ticket;

    /// Input for submitting a contribution payment claim.
    #[derive(Debug, Clone)]
    pub struct SubmitClaimCommand {
        pub member_id: String,
        pub amount: f64,
        pub requested_number: Option<u32>,
    }

    /// Input for approving a pending claim.
    #[derive(Debug, Clone)]
    pub struct ApproveClaimCommand {
        pub claim_id: String,
    }

    /// Input for rejecting a pending claim.
    #[derive(Debug, Clone)]
    pub struct RejectClaimCommand {
        pub claim_id: String,
    }

    /// Informational notice that a requested number was already held and a
    /// substitute was assigned instead.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NumberConflict {
        pub requested_number: u32,
        pub assigned_number: u32,
    }

    /// Result of approving a claim.
    #[derive(Debug, Clone)]
    pub struct ApproveClaimResult {
        pub claim: PaymentClaim,
        /// The ticket the member ended up with.
        pub ticket: Ticket,
        pub conflict: Option<NumberConflict>,
    }

    /// Result of rejecting a claim.
    #[derive(Debug, Clone)]
    pub struct RejectClaimResult {
        pub claim: PaymentClaim,
        /// The reservation that was released, if one existed.
        pub released_ticket: Option<Ticket>,
    }
}

pub mod members {
    use crate::domain::models::member::Member;

    /// Input for registering a new member.
    #[derive(Debug, Clone)]
    pub struct CreateMemberCommand {
        pub name: String,
    }

    /// Dashboard view of one member with the derived lucky number.
    #[derive(Debug, Clone)]
    pub struct MemberOverviewResult {
        pub member: Member,
        pub cycle: u32,
        /// Number of the member's active ticket in the current cycle, if any.
        pub lucky_number: Option<u32>,
    }
}

pub mod cycle {
    use crate::domain::models::draw_settings::DrawSettings;

    /// Result of closing the current cycle and opening the next one.
    #[derive(Debug, Clone)]
    pub struct AdvanceCycleResult {
        pub settings: DrawSettings,
        /// How many member records were reset for the new cycle.
        pub members_reset: usize,
    }

    /// Current draw schedule plus the dashboard countdown.
    #[derive(Debug, Clone)]
    pub struct DrawScheduleResult {
        pub settings: DrawSettings,
        /// Whole days until the draw; negative once the date has passed.
        pub days_remaining: i64,
    }
}
