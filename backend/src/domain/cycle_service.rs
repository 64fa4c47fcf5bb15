//! Cycle rollover and draw scheduling.
//!
//! Owns the draw settings document. `advance` bumps the cycle counter,
//! schedules the next draw 30 days out (with the Ethiopian rendering the
//! dashboard shows), and resets every member for the new round. The member
//! reset is a single batched write keyed on `last_reset_cycle`, so a crashed
//! rollover can be finished later with `reset_stale_members` instead of
//! leaving members in mixed cycle states.

use chrono::Local;
use log::info;
use std::sync::Arc;

use crate::domain::commands::cycle::{AdvanceCycleResult, DrawScheduleResult};
use crate::domain::errors::EqubError;
use crate::domain::models::draw_settings::DrawSettings;
use crate::storage::csv::{CsvConnection, MemberRepository, SettingsRepository};
use crate::storage::traits::{MemberStorage, SettingsStorage};

#[derive(Clone)]
pub struct CycleService {
    settings_repository: SettingsRepository,
    member_repository: MemberRepository,
}

impl CycleService {
    /// Create a new CycleService
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self {
            settings_repository: SettingsRepository::new((*connection).clone()),
            member_repository: MemberRepository::new((*connection).clone()),
        }
    }

    /// The current settings record. Everyone outside this service reads the
    /// cycle counter and draw date through here.
    pub fn current_settings(&self) -> Result<DrawSettings, EqubError> {
        Ok(self.settings_repository.get_settings()?)
    }

    /// Current cycle number.
    pub fn current_cycle(&self) -> Result<u32, EqubError> {
        Ok(self.settings_repository.get_settings()?.cycle)
    }

    /// Draw schedule plus the countdown shown on the dashboard.
    pub fn draw_schedule(&self) -> Result<DrawScheduleResult, EqubError> {
        let settings = self.settings_repository.get_settings()?;
        let today = Local::now().date_naive();
        let days_remaining = (settings.draw_date - today).num_days();
        Ok(DrawScheduleResult {
            settings,
            days_remaining,
        })
    }

    /// Close the current cycle and open the next one.
    ///
    /// The cycle counter advances first; the member reset that follows is
    /// idempotent, so a failure there leaves an advanced cycle that
    /// `reset_stale_members` can finish repairing. Tickets of the previous
    /// cycle are left untouched as history; the new cycle's numbering starts
    /// from a clean ledger file.
    pub fn advance(&self) -> Result<AdvanceCycleResult, EqubError> {
        let settings = self.settings_repository.get_settings()?;
        let today = Local::now().date_naive();

        let mut next = DrawSettings::for_cycle(settings.cycle + 1, today);
        next.version = settings.version;
        let stored = self.settings_repository.store_settings(&next)?;
        info!(
            "Advanced to cycle {}; next draw {} ({})",
            stored.cycle, stored.draw_date, stored.draw_date_display_en
        );

        let members_reset = self.member_repository.reset_members_behind(stored.cycle)?;

        Ok(AdvanceCycleResult {
            settings: stored,
            members_reset,
        })
    }

    /// Finish a rollover that died between the cycle bump and the member
    /// reset. Safe to call any time; does nothing when everyone is current.
    pub fn reset_stale_members(&self) -> Result<usize, EqubError> {
        let settings = self.settings_repository.get_settings()?;
        Ok(self.member_repository.reset_members_behind(settings.cycle)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ethiopian_calendar;
    use crate::domain::models::member::{Member, MemberStatus};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn setup() -> (CycleService, MemberRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection =
            Arc::new(CsvConnection::new(temp_dir.path()).expect("Failed to create connection"));
        let members = MemberRepository::new((*connection).clone());
        (CycleService::new(connection), members, temp_dir)
    }

    fn store_member(repo: &MemberRepository, id: &str, contribution: f64) {
        let member = Member {
            id: id.to_string(),
            name: format!("Member {}", id),
            status: if contribution > 0.0 { MemberStatus::Verified } else { MemberStatus::Pending },
            contribution,
            last_reset_cycle: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        repo.store_member(&member).expect("Failed to store member");
    }

    #[test]
    fn test_advance_bumps_cycle_and_resets_members() {
        let (service, members, _temp_dir) = setup();
        store_member(&members, "member::1", 5000.0);
        store_member(&members, "member::2", 0.0);

        assert_eq!(service.current_cycle().expect("Failed to read cycle"), 1);

        let result = service.advance().expect("Failed to advance");
        assert_eq!(result.settings.cycle, 2);
        assert_eq!(result.members_reset, 2);

        let member = members
            .get_member("member::1")
            .expect("Failed to get member")
            .expect("Member should exist");
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.contribution, 0.0);
        assert_eq!(member.last_reset_cycle, 2);

        assert_eq!(service.current_cycle().expect("Failed to read cycle"), 2);
    }

    #[test]
    fn test_advance_schedules_draw_thirty_days_out() {
        let (service, _members, _temp_dir) = setup();

        let result = service.advance().expect("Failed to advance");
        let today = Local::now().date_naive();
        assert_eq!(result.settings.draw_date, today + Duration::days(30));

        // The Ethiopian rendering matches the converter.
        let expected = ethiopian_calendar::to_ethiopian(result.settings.draw_date);
        assert_eq!(result.settings.draw_date_ethiopian, expected);
        assert_eq!(result.settings.draw_date_display_en, expected.format_en());
        assert_eq!(result.settings.draw_date_display_am, expected.format_am());
    }

    #[test]
    fn test_advance_bumps_settings_version() {
        let (service, _members, _temp_dir) = setup();

        let before = service.current_settings().expect("Failed to read settings");
        let result = service.advance().expect("Failed to advance");
        assert!(result.settings.version > before.version);
    }

    #[test]
    fn test_reset_stale_members_finishes_crashed_rollover() {
        let (service, members, _temp_dir) = setup();
        service.advance().expect("Failed to advance");

        // This member was missed by the rollover (still on cycle 1).
        store_member(&members, "member::late", 750.0);

        let repaired = service.reset_stale_members().expect("Failed to repair");
        assert_eq!(repaired, 1);

        let member = members
            .get_member("member::late")
            .expect("Failed to get member")
            .expect("Member should exist");
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.contribution, 0.0);
        assert_eq!(member.last_reset_cycle, 2);

        // Second pass is a no-op.
        assert_eq!(service.reset_stale_members().expect("Failed to repair"), 0);
    }

    #[test]
    fn test_draw_schedule_countdown() {
        let (service, _members, _temp_dir) = setup();

        // Bootstrap schedules 30 days out from today.
        let schedule = service.draw_schedule().expect("Failed to read schedule");
        assert_eq!(schedule.days_remaining, 30);
    }
}
