//! Reconciliation of payment claims into ticket and member state.
//!
//! Approval confirms the member's reservation when it is still theirs, or
//! falls back to the smallest free number when the requested one is gone.
//! Rejection releases the reservation. Either way the claim reaches a
//! terminal state exactly once; a racing second reviewer sees
//! `AlreadyProcessed` instead of repeated side effects.

use chrono::{Local, Utc};
use log::{info, warn};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::commands::claims::{
    ApproveClaimCommand, ApproveClaimResult, NumberConflict, RejectClaimCommand,
    RejectClaimResult, SubmitClaimCommand,
};
use crate::domain::errors::EqubError;
use crate::domain::models::payment_claim::{ClaimStatus, PaymentClaim};
use crate::domain::models::ticket::{AssignedBy, Ticket, TicketState};
use crate::storage::csv::{
    ClaimRepository, CsvConnection, MemberRepository, SettingsRepository, TicketRepository,
};
use crate::storage::traits::{
    ClaimStorage, ClaimTransition, MemberStorage, SettingsStorage, TicketStorage,
};

#[derive(Clone)]
pub struct ReconciliationService {
    claim_repository: ClaimRepository,
    member_repository: MemberRepository,
    ticket_repository: TicketRepository,
    settings_repository: SettingsRepository,
    /// Serializes approve/reject so racing reviewers of the same claim
    /// cannot interleave between the terminal-state check and the writes.
    review_guard: Arc<Mutex<()>>,
}

impl ReconciliationService {
    /// Create a new ReconciliationService
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self {
            claim_repository: ClaimRepository::new((*connection).clone()),
            member_repository: MemberRepository::new((*connection).clone()),
            ticket_repository: TicketRepository::new((*connection).clone()),
            settings_repository: SettingsRepository::new((*connection).clone()),
            review_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Record a member's contribution payment for the current cycle.
    pub fn submit_claim(&self, command: SubmitClaimCommand) -> Result<PaymentClaim, EqubError> {
        let member = self
            .member_repository
            .get_member(&command.member_id)?
            .ok_or_else(|| EqubError::NotFound(format!("member {}", command.member_id)))?;

        let cycle = self.settings_repository.get_settings()?.cycle;

        let claim = PaymentClaim {
            id: PaymentClaim::generate_id(Self::epoch_millis()?),
            member_id: member.id,
            amount: command.amount,
            requested_number: command.requested_number,
            cycle,
            status: ClaimStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
        };

        self.claim_repository.store_claim(&claim)?;
        info!(
            "Submitted claim {} for member {} (amount {}, requested number {:?})",
            claim.id, claim.member_id, claim.amount, claim.requested_number
        );
        Ok(claim)
    }

    /// The admin review queue, oldest first.
    pub fn pending_claims(&self) -> Result<Vec<PaymentClaim>, EqubError> {
        Ok(self.claim_repository.list_claims_by_status(ClaimStatus::Pending)?)
    }

    /// Approve a claim: confirm or assign a ticket, then credit the member.
    ///
    /// A requested number that is no longer available is substituted with
    /// the smallest free one; the outcome carries a conflict notice so the
    /// admin can tell the member. The operation is all-or-nothing: the claim
    /// only becomes `Approved` after the ticket work succeeded.
    pub fn approve(&self, command: ApproveClaimCommand) -> Result<ApproveClaimResult, EqubError> {
        let _guard = self.review_guard.lock().unwrap();

        let claim = self
            .claim_repository
            .get_claim(&command.claim_id)?
            .ok_or_else(|| EqubError::NotFound(format!("claim {}", command.claim_id)))?;
        if claim.status.is_terminal() {
            return Err(EqubError::AlreadyProcessed(claim.id));
        }

        let member = self
            .member_repository
            .get_member(&claim.member_id)?
            .ok_or_else(|| EqubError::NotFound(format!("member {}", claim.member_id)))?;

        let today = Local::now().date_naive();
        let (ticket, conflict) = self.resolve_ticket(&claim, &member.name, today)?;

        let transitioned =
            match self
                .claim_repository
                .transition_claim_if_pending(&claim.id, ClaimStatus::Approved, Utc::now())?
            {
                ClaimTransition::Applied(claim) => claim,
                ClaimTransition::AlreadyProcessed(claim) => {
                    return Err(EqubError::AlreadyProcessed(claim.id));
                }
                ClaimTransition::NotFound => {
                    return Err(EqubError::NotFound(format!("claim {}", claim.id)));
                }
            };

        self.member_repository
            .apply_contribution(&claim.member_id, claim.amount)?
            .ok_or_else(|| EqubError::NotFound(format!("member {}", claim.member_id)))?;

        info!(
            "Approved claim {}: member {} holds number {} in cycle {}",
            transitioned.id, transitioned.member_id, ticket.number, ticket.cycle
        );

        Ok(ApproveClaimResult {
            claim: transitioned,
            ticket,
            conflict,
        })
    }

    /// Reject a claim and release the member's reservation, if one exists.
    /// Member status and contribution are untouched.
    pub fn reject(&self, command: RejectClaimCommand) -> Result<RejectClaimResult, EqubError> {
        let _guard = self.review_guard.lock().unwrap();

        let claim = self
            .claim_repository
            .get_claim(&command.claim_id)?
            .ok_or_else(|| EqubError::NotFound(format!("claim {}", command.claim_id)))?;
        if claim.status.is_terminal() {
            return Err(EqubError::AlreadyProcessed(claim.id));
        }

        let transitioned =
            match self
                .claim_repository
                .transition_claim_if_pending(&claim.id, ClaimStatus::Rejected, Utc::now())?
            {
                ClaimTransition::Applied(claim) => claim,
                ClaimTransition::AlreadyProcessed(claim) => {
                    return Err(EqubError::AlreadyProcessed(claim.id));
                }
                ClaimTransition::NotFound => {
                    return Err(EqubError::NotFound(format!("claim {}", claim.id)));
                }
            };

        let released_ticket = self.release_reservation(&transitioned)?;

        info!(
            "Rejected claim {} for member {} (released ticket: {:?})",
            transitioned.id,
            transitioned.member_id,
            released_ticket.as_ref().map(|t| t.number)
        );

        Ok(RejectClaimResult {
            claim: transitioned,
            released_ticket,
        })
    }

    /// Work out which ticket the approval lands on.
    fn resolve_ticket(
        &self,
        claim: &PaymentClaim,
        member_name: &str,
        today: chrono::NaiveDate,
    ) -> Result<(Ticket, Option<NumberConflict>), EqubError> {
        let Some(requested) = claim.requested_number else {
            // No number requested: auto-assign the smallest free one.
            let ticket = self.ticket_repository.create_ticket_at_next_available(
                claim.cycle,
                &claim.member_id,
                member_name,
                TicketState::Active,
                AssignedBy::System,
                Some(today),
            )?;
            return Ok((ticket, None));
        };

        match self.ticket_repository.find_holder(claim.cycle, requested)? {
            Some(holder)
                if holder.owner_id == claim.member_id
                    && holder.state == TicketState::Pending =>
            {
                // The member's own reservation: confirm it.
                let confirmed = self
                    .ticket_repository
                    .confirm_if_pending(claim.cycle, &holder.id, AssignedBy::Admin, today)?
                    .ok_or_else(|| {
                        EqubError::NotFound(format!("pending ticket {}", holder.id))
                    })?;
                Ok((confirmed, None))
            }
            Some(holder) => {
                // Someone else holds the number (or it is already active):
                // substitute the smallest free number instead.
                let substitute = self.ticket_repository.create_ticket_at_next_available(
                    claim.cycle,
                    &claim.member_id,
                    member_name,
                    TicketState::Active,
                    AssignedBy::System,
                    Some(today),
                )?;
                warn!(
                    "Number {} in cycle {} is held by {}; assigned {} to member {} instead",
                    requested, claim.cycle, holder.owner_id, substitute.number, claim.member_id
                );
                let assigned_number = substitute.number;
                Ok((
                    substitute,
                    Some(NumberConflict {
                        requested_number: requested,
                        assigned_number,
                    }),
                ))
            }
            None => {
                // Requested number is free (no reservation on file): grant it
                // directly as an active ticket.
                let ticket = Ticket {
                    id: Ticket::generate_id(Self::epoch_millis()?),
                    number: requested,
                    cycle: claim.cycle,
                    owner_id: claim.member_id.clone(),
                    owner_name: member_name.to_string(),
                    state: TicketState::Active,
                    assigned_by: AssignedBy::System,
                    assigned_date: Some(today),
                    created_at: Utc::now(),
                };
                match self.ticket_repository.create_ticket_if_free(&ticket)? {
                    Some(stored) => Ok((stored, None)),
                    None => {
                        // Lost a race for the number after the check above:
                        // fall back to substitution.
                        let substitute = self.ticket_repository.create_ticket_at_next_available(
                            claim.cycle,
                            &claim.member_id,
                            member_name,
                            TicketState::Active,
                            AssignedBy::System,
                            Some(today),
                        )?;
                        let assigned_number = substitute.number;
                        Ok((
                            substitute,
                            Some(NumberConflict {
                                requested_number: requested,
                                assigned_number,
                            }),
                        ))
                    }
                }
            }
        }
    }

    fn release_reservation(
        &self,
        claim: &PaymentClaim,
    ) -> Result<Option<Ticket>, EqubError> {
        let Some(requested) = claim.requested_number else {
            return Ok(None);
        };
        let Some(holder) = self.ticket_repository.find_holder(claim.cycle, requested)? else {
            return Ok(None);
        };
        if holder.owner_id != claim.member_id || holder.state != TicketState::Pending {
            return Ok(None);
        }

        let today = Local::now().date_naive();
        Ok(self
            .ticket_repository
            .release_ticket(claim.cycle, &holder.id, today)?)
    }

    fn epoch_millis() -> Result<u64, EqubError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(anyhow::Error::from)?
            .as_millis() as u64;
        Ok(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::tickets::ReserveNumberCommand;
    use crate::domain::models::member::{Member, MemberStatus};
    use crate::domain::ticket_service::TicketService;
    use tempfile::TempDir;

    struct Fixture {
        service: ReconciliationService,
        tickets: TicketService,
        members: MemberRepository,
        _temp_dir: TempDir,
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to create connection"));
        let fixture = Fixture {
            service: ReconciliationService::new(connection.clone()),
            tickets: TicketService::new(connection.clone()),
            members: MemberRepository::new((*connection).clone()),
            _temp_dir: temp_dir,
        };
        for (id, name) in [("member::a", "Abebe"), ("member::b", "Birtukan"), ("member::c", "Chaltu")] {
            let member = Member {
                id: id.to_string(),
                name: name.to_string(),
                status: MemberStatus::Pending,
                contribution: 0.0,
                last_reset_cycle: 1,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            fixture.members.store_member(&member).expect("Failed to store member");
        }
        fixture
    }

    fn submit(
        fixture: &Fixture,
        member_id: &str,
        amount: f64,
        requested_number: Option<u32>,
    ) -> PaymentClaim {
        fixture
            .service
            .submit_claim(SubmitClaimCommand {
                member_id: member_id.to_string(),
                amount,
                requested_number,
            })
            .expect("Failed to submit claim")
    }

    fn reserve(fixture: &Fixture, number: u32, member_id: &str) -> Ticket {
        fixture
            .tickets
            .reserve(ReserveNumberCommand {
                cycle: 1,
                number,
                member_id: member_id.to_string(),
            })
            .expect("Failed to reserve")
    }

    #[test]
    fn test_approve_confirms_own_reservation() {
        let fixture = setup();

        let reservation = reserve(&fixture, 7, "member::a");
        let claim = submit(&fixture, "member::a", 5000.0, Some(7));

        let result = fixture
            .service
            .approve(ApproveClaimCommand { claim_id: claim.id.clone() })
            .expect("Failed to approve");

        assert_eq!(result.ticket.id, reservation.id);
        assert_eq!(result.ticket.number, 7);
        assert_eq!(result.ticket.state, TicketState::Active);
        assert_eq!(result.ticket.assigned_by, AssignedBy::Admin);
        assert!(result.conflict.is_none());
        assert_eq!(result.claim.status, ClaimStatus::Approved);

        let member = fixture
            .members
            .get_member("member::a")
            .expect("Failed to get member")
            .expect("Member should exist");
        assert_eq!(member.status, MemberStatus::Verified);
        assert_eq!(member.contribution, 5000.0);
    }

    #[test]
    fn test_approve_substitutes_taken_number() {
        let fixture = setup();

        // A owns number 7, already approved.
        reserve(&fixture, 7, "member::a");
        let claim_a = submit(&fixture, "member::a", 5000.0, Some(7));
        fixture
            .service
            .approve(ApproveClaimCommand { claim_id: claim_a.id })
            .expect("Failed to approve");

        // C asks for 7 as well: gets the smallest free number instead.
        let claim_c = submit(&fixture, "member::c", 5000.0, Some(7));
        let result = fixture
            .service
            .approve(ApproveClaimCommand { claim_id: claim_c.id })
            .expect("Failed to approve");

        assert_eq!(result.ticket.number, 1);
        assert_eq!(result.ticket.state, TicketState::Active);
        assert_eq!(result.ticket.assigned_by, AssignedBy::System);
        assert_eq!(
            result.conflict,
            Some(NumberConflict { requested_number: 7, assigned_number: 1 })
        );
    }

    #[test]
    fn test_approve_without_requested_number_auto_assigns() {
        let fixture = setup();

        reserve(&fixture, 1, "member::a");
        let claim = submit(&fixture, "member::b", 5000.0, None);

        let result = fixture
            .service
            .approve(ApproveClaimCommand { claim_id: claim.id })
            .expect("Failed to approve");

        // 1 is held, so the scan lands on 2.
        assert_eq!(result.ticket.number, 2);
        assert_eq!(result.ticket.assigned_by, AssignedBy::System);
        assert!(result.conflict.is_none());
    }

    #[test]
    fn test_approve_grants_free_requested_number_without_reservation() {
        let fixture = setup();

        let claim = submit(&fixture, "member::b", 5000.0, Some(42));
        let result = fixture
            .service
            .approve(ApproveClaimCommand { claim_id: claim.id })
            .expect("Failed to approve");

        assert_eq!(result.ticket.number, 42);
        assert_eq!(result.ticket.state, TicketState::Active);
        assert!(result.conflict.is_none());
    }

    #[test]
    fn test_approve_twice_reports_already_processed() {
        let fixture = setup();

        reserve(&fixture, 7, "member::a");
        let claim = submit(&fixture, "member::a", 5000.0, Some(7));

        fixture
            .service
            .approve(ApproveClaimCommand { claim_id: claim.id.clone() })
            .expect("Failed to approve");

        let err = fixture
            .service
            .approve(ApproveClaimCommand { claim_id: claim.id.clone() })
            .expect_err("second approval must fail");
        assert!(matches!(err, EqubError::AlreadyProcessed(_)));

        // State is unchanged after the failed repeat.
        let member = fixture
            .members
            .get_member("member::a")
            .expect("Failed to get member")
            .expect("Member should exist");
        assert_eq!(member.contribution, 5000.0);
        let board = fixture.tickets.number_board(1).expect("Failed to build board");
        assert_eq!(board.taken.len(), 1);
    }

    #[test]
    fn test_reject_releases_reservation_and_leaves_member_alone() {
        let fixture = setup();

        reserve(&fixture, 5, "member::a");
        let claim = submit(&fixture, "member::a", 5000.0, Some(5));

        let result = fixture
            .service
            .reject(RejectClaimCommand { claim_id: claim.id.clone() })
            .expect("Failed to reject");

        assert_eq!(result.claim.status, ClaimStatus::Rejected);
        assert_eq!(result.released_ticket.as_ref().map(|t| t.number), Some(5));
        assert!(fixture.tickets.find_free(1, 5).expect("Failed to query"));

        let member = fixture
            .members
            .get_member("member::a")
            .expect("Failed to get member")
            .expect("Member should exist");
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.contribution, 0.0);

        // Rejecting again is refused.
        let err = fixture
            .service
            .reject(RejectClaimCommand { claim_id: claim.id })
            .expect_err("second rejection must fail");
        assert!(matches!(err, EqubError::AlreadyProcessed(_)));
    }

    #[test]
    fn test_reject_does_not_release_someone_elses_ticket() {
        let fixture = setup();

        reserve(&fixture, 5, "member::b");
        let claim = submit(&fixture, "member::a", 5000.0, Some(5));

        let result = fixture
            .service
            .reject(RejectClaimCommand { claim_id: claim.id })
            .expect("Failed to reject");

        assert!(result.released_ticket.is_none());
        assert!(!fixture.tickets.find_free(1, 5).expect("Failed to query"));
    }

    #[test]
    fn test_pending_claims_queue() {
        let fixture = setup();

        let first = submit(&fixture, "member::a", 5000.0, None);
        let second = submit(&fixture, "member::b", 5000.0, None);

        let pending = fixture.service.pending_claims().expect("Failed to list");
        let ids: Vec<&str> = pending.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

        fixture
            .service
            .approve(ApproveClaimCommand { claim_id: first.id })
            .expect("Failed to approve");
        let pending = fixture.service.pending_claims().expect("Failed to list");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);
    }
}
