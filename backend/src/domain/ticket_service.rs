//! Ticket ledger service.
//!
//! The single owner of ticket lifecycle transitions. Reservation goes through
//! the storage layer's atomic check-then-create, so two members racing for
//! the same number get exactly one winner; the loser is told to pick another
//! number.

use chrono::{Local, Utc};
use log::{info, warn};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::capacity::visible_capacity;
use crate::domain::commands::tickets::{NumberBoardResult, ReserveNumberCommand};
use crate::domain::errors::EqubError;
use crate::domain::models::ticket::{AssignedBy, Ticket, TicketState};
use crate::storage::csv::{CsvConnection, MemberRepository, TicketRepository};
use crate::storage::traits::{MemberStorage, TicketStorage};

#[derive(Clone)]
pub struct TicketService {
    ticket_repository: TicketRepository,
    member_repository: MemberRepository,
}

impl TicketService {
    /// Create a new TicketService
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        let ticket_repository = TicketRepository::new((*connection).clone());
        let member_repository = MemberRepository::new((*connection).clone());
        Self {
            ticket_repository,
            member_repository,
        }
    }

    /// Soft-hold a lucky number for a member while their payment claim is
    /// reviewed. Fails with `NumberTaken` when the slot is held.
    pub fn reserve(&self, command: ReserveNumberCommand) -> Result<Ticket, EqubError> {
        info!(
            "Reserving number {} in cycle {} for member {}",
            command.number, command.cycle, command.member_id
        );

        let member = self
            .member_repository
            .get_member(&command.member_id)?
            .ok_or_else(|| EqubError::NotFound(format!("member {}", command.member_id)))?;

        let ticket = Ticket {
            id: Ticket::generate_id(Self::epoch_millis()?),
            number: command.number,
            cycle: command.cycle,
            owner_id: member.id,
            owner_name: member.name,
            state: TicketState::Pending,
            assigned_by: AssignedBy::User,
            assigned_date: None,
            created_at: Utc::now(),
        };

        match self.ticket_repository.create_ticket_if_free(&ticket)? {
            Some(stored) => Ok(stored),
            None => {
                warn!(
                    "Number {} in cycle {} is already taken",
                    command.number, command.cycle
                );
                Err(EqubError::NumberTaken {
                    cycle: command.cycle,
                    number: command.number,
                })
            }
        }
    }

    /// Confirm a pending ticket, making it eligible for the draw.
    pub fn confirm(
        &self,
        cycle: u32,
        ticket_id: &str,
        assigned_by: AssignedBy,
    ) -> Result<Ticket, EqubError> {
        let today = Local::now().date_naive();
        self.ticket_repository
            .confirm_if_pending(cycle, ticket_id, assigned_by, today)?
            .ok_or_else(|| EqubError::NotFound(format!("pending ticket {}", ticket_id)))
    }

    /// Release a ticket, freeing its number. Idempotent on already-void
    /// tickets.
    pub fn release(&self, cycle: u32, ticket_id: &str) -> Result<Ticket, EqubError> {
        let today = Local::now().date_naive();
        self.ticket_repository
            .release_ticket(cycle, ticket_id, today)?
            .ok_or_else(|| EqubError::NotFound(format!("ticket {}", ticket_id)))
    }

    /// True iff no pending/active ticket holds `(cycle, number)`.
    pub fn find_free(&self, cycle: u32, number: u32) -> Result<bool, EqubError> {
        Ok(self.ticket_repository.find_holder(cycle, number)?.is_none())
    }

    /// Smallest free number in the cycle.
    pub fn next_available(&self, cycle: u32) -> Result<u32, EqubError> {
        Ok(self.ticket_repository.next_available_number(cycle)?)
    }

    /// Count of active tickets in the cycle.
    pub fn active_count(&self, cycle: u32) -> Result<u32, EqubError> {
        Ok(self.ticket_repository.active_count_for_cycle(cycle)?)
    }

    /// Snapshot of the number board: visible capacity plus all held numbers.
    pub fn number_board(&self, cycle: u32) -> Result<NumberBoardResult, EqubError> {
        let tickets = self.ticket_repository.list_tickets(cycle)?;

        let mut taken: Vec<Ticket> = tickets
            .into_iter()
            .filter(|t| t.state.holds_number())
            .collect();
        taken.sort_by_key(|t| t.number);

        let active_count = taken
            .iter()
            .filter(|t| t.state == TicketState::Active)
            .count() as u32;

        Ok(NumberBoardResult {
            cycle,
            capacity: visible_capacity(active_count),
            active_count,
            taken,
        })
    }

    /// The member's active ticket in the cycle, if any. This is the lucky
    /// number shown on the dashboard; it is derived here instead of being
    /// stored on the member record.
    pub fn member_active_ticket(
        &self,
        cycle: u32,
        member_id: &str,
    ) -> Result<Option<Ticket>, EqubError> {
        Ok(self.ticket_repository.find_active_ticket(cycle, member_id)?)
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
    use crate::domain::models::member::{Member, MemberStatus};
    use tempfile::TempDir;

    fn setup_test_service() -> (TicketService, MemberRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to create connection"));
        let member_repository = MemberRepository::new((*connection).clone());
        (TicketService::new(connection), member_repository, temp_dir)
    }

    fn store_member(repo: &MemberRepository, id: &str, name: &str) {
        let member = Member {
            id: id.to_string(),
            name: name.to_string(),
            status: MemberStatus::Pending,
            contribution: 0.0,
            last_reset_cycle: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        repo.store_member(&member).expect("Failed to store member");
    }

    fn reserve(service: &TicketService, cycle: u32, number: u32, member_id: &str) -> Result<Ticket, EqubError> {
        service.reserve(ReserveNumberCommand {
            cycle,
            number,
            member_id: member_id.to_string(),
        })
    }

    #[test]
    fn test_reserve_creates_pending_ticket() {
        let (service, members, _temp_dir) = setup_test_service();
        store_member(&members, "member::1", "Abebe");

        let ticket = reserve(&service, 1, 7, "member::1").expect("Failed to reserve");
        assert_eq!(ticket.number, 7);
        assert_eq!(ticket.state, TicketState::Pending);
        assert_eq!(ticket.assigned_by, AssignedBy::User);
        assert_eq!(ticket.owner_name, "Abebe");
        assert_eq!(ticket.assigned_date, None);

        assert!(!service.find_free(1, 7).expect("Failed to query"));
    }

    #[test]
    fn test_reserve_same_number_twice_fails() {
        let (service, members, _temp_dir) = setup_test_service();
        store_member(&members, "member::1", "Abebe");
        store_member(&members, "member::2", "Chaltu");

        reserve(&service, 1, 7, "member::1").expect("Failed to reserve");

        let err = reserve(&service, 1, 7, "member::2").expect_err("second reserve must fail");
        assert!(matches!(err, EqubError::NumberTaken { cycle: 1, number: 7 }));
    }

    #[test]
    fn test_reserve_unknown_member_fails() {
        let (service, _members, _temp_dir) = setup_test_service();

        let err = reserve(&service, 1, 7, "member::404").expect_err("must fail");
        assert!(matches!(err, EqubError::NotFound(_)));
    }

    #[test]
    fn test_release_frees_the_number_again() {
        let (service, members, _temp_dir) = setup_test_service();
        store_member(&members, "member::1", "Abebe");

        let ticket = reserve(&service, 1, 5, "member::1").expect("Failed to reserve");
        service.release(1, &ticket.id).expect("Failed to release");

        assert!(service.find_free(1, 5).expect("Failed to query"));
    }

    #[test]
    fn test_number_board_capacity_follows_active_count() {
        let (service, members, _temp_dir) = setup_test_service();
        for i in 1..=3 {
            store_member(&members, &format!("member::{}", i), &format!("Member {}", i));
        }

        let board = service.number_board(1).expect("Failed to build board");
        assert_eq!(board.capacity, 100);
        assert_eq!(board.active_count, 0);
        assert!(board.taken.is_empty());

        // Two confirmed tickets push the visible range to 200.
        for (i, number) in [(1, 10), (2, 20)] {
            let ticket = reserve(&service, 1, number, &format!("member::{}", i))
                .expect("Failed to reserve");
            service
                .confirm(1, &ticket.id, AssignedBy::Admin)
                .expect("Failed to confirm");
        }
        let pending = reserve(&service, 1, 30, "member::3").expect("Failed to reserve");

        let board = service.number_board(1).expect("Failed to build board");
        assert_eq!(board.active_count, 2);
        assert_eq!(board.capacity, 200);
        let numbers: Vec<u32> = board.taken.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![10, 20, 30]);
        assert_eq!(pending.state, TicketState::Pending);
    }

    #[test]
    fn test_member_active_ticket_is_derived_from_ledger() {
        let (service, members, _temp_dir) = setup_test_service();
        store_member(&members, "member::1", "Abebe");

        assert!(service
            .member_active_ticket(1, "member::1")
            .expect("Failed to query")
            .is_none());

        let ticket = reserve(&service, 1, 7, "member::1").expect("Failed to reserve");
        // Pending tickets are not the lucky number yet.
        assert!(service
            .member_active_ticket(1, "member::1")
            .expect("Failed to query")
            .is_none());

        service
            .confirm(1, &ticket.id, AssignedBy::Admin)
            .expect("Failed to confirm");
        let active = service
            .member_active_ticket(1, "member::1")
            .expect("Failed to query")
            .expect("Active ticket should exist");
        assert_eq!(active.number, 7);
    }
}
