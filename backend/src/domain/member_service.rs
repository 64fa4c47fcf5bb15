//! Member directory operations.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::commands::members::{CreateMemberCommand, MemberOverviewResult};
use crate::domain::errors::EqubError;
use crate::domain::models::member::{Member, MemberStatus};
use crate::storage::csv::{CsvConnection, MemberRepository, SettingsRepository, TicketRepository};
use crate::storage::traits::{MemberStorage, SettingsStorage, TicketStorage};

#[derive(Clone)]
pub struct MemberService {
    member_repository: MemberRepository,
    ticket_repository: TicketRepository,
    settings_repository: SettingsRepository,
}

impl MemberService {
    /// Create a new MemberService
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self {
            member_repository: MemberRepository::new((*connection).clone()),
            ticket_repository: TicketRepository::new((*connection).clone()),
            settings_repository: SettingsRepository::new((*connection).clone()),
        }
    }

    /// Register a new member. New members join pending, with no contribution
    /// recorded for the current cycle.
    pub fn create_member(&self, command: CreateMemberCommand) -> Result<Member, EqubError> {
        let now = Utc::now();
        let cycle = self.settings_repository.get_settings()?.cycle;

        let member = Member {
            id: Member::generate_id(Self::epoch_millis()?),
            name: command.name.trim().to_string(),
            status: MemberStatus::Pending,
            contribution: 0.0,
            last_reset_cycle: cycle,
            created_at: now,
            updated_at: now,
        };

        self.member_repository.store_member(&member)?;
        info!("Registered member {} ({})", member.name, member.id);
        Ok(member)
    }

    /// Get a member by ID
    pub fn get_member(&self, member_id: &str) -> Result<Member, EqubError> {
        self.member_repository
            .get_member(member_id)?
            .ok_or_else(|| EqubError::NotFound(format!("member {}", member_id)))
    }

    /// List all members, ordered by name
    pub fn list_members(&self) -> Result<Vec<Member>, EqubError> {
        Ok(self.member_repository.list_members()?)
    }

    /// The member's dashboard view. The lucky number is looked up in the
    /// current cycle's ledger on every call rather than read from the member
    /// record, so it can never go stale across rollovers.
    pub fn member_overview(&self, member_id: &str) -> Result<MemberOverviewResult, EqubError> {
        let member = self.get_member(member_id)?;
        let cycle = self.settings_repository.get_settings()?.cycle;

        let lucky_number = self
            .ticket_repository
            .find_active_ticket(cycle, &member.id)?
            .map(|t| t.number);

        if lucky_number.is_none() && member.status == MemberStatus::Verified {
            warn!(
                "Verified member {} has no active ticket in cycle {}",
                member.id, cycle
            );
        }

        Ok(MemberOverviewResult {
            member,
            cycle,
            lucky_number,
        })
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
    use crate::domain::models::ticket::AssignedBy;
    use crate::domain::ticket_service::TicketService;
    use tempfile::TempDir;

    fn setup() -> (MemberService, TicketService, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to create connection"));
        (
            MemberService::new(connection.clone()),
            TicketService::new(connection),
            temp_dir,
        )
    }

    #[test]
    fn test_create_and_get_member() {
        let (service, _tickets, _temp_dir) = setup();

        let member = service
            .create_member(CreateMemberCommand { name: "  Abebe  ".to_string() })
            .expect("Failed to create member");
        assert_eq!(member.name, "Abebe");
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.contribution, 0.0);
        assert_eq!(member.last_reset_cycle, 1);

        let loaded = service.get_member(&member.id).expect("Failed to get member");
        assert_eq!(loaded, member);

        let err = service.get_member("member::404").expect_err("must fail");
        assert!(matches!(err, EqubError::NotFound(_)));
    }

    #[test]
    fn test_overview_derives_lucky_number_from_ledger() {
        let (service, tickets, _temp_dir) = setup();

        let member = service
            .create_member(CreateMemberCommand { name: "Abebe".to_string() })
            .expect("Failed to create member");

        let overview = service.member_overview(&member.id).expect("Failed to build overview");
        assert_eq!(overview.cycle, 1);
        assert_eq!(overview.lucky_number, None);

        let ticket = tickets
            .reserve(ReserveNumberCommand {
                cycle: 1,
                number: 11,
                member_id: member.id.clone(),
            })
            .expect("Failed to reserve");
        tickets
            .confirm(1, &ticket.id, AssignedBy::Admin)
            .expect("Failed to confirm");

        let overview = service.member_overview(&member.id).expect("Failed to build overview");
        assert_eq!(overview.lucky_number, Some(11));
    }
}
