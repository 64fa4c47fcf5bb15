use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::member::{Member, MemberStatus};
use crate::storage::traits::MemberStorage;

/// CSV-based member directory repository (`members.csv`).
#[derive(Clone)]
pub struct MemberRepository {
    connection: CsvConnection,
}

impl MemberRepository {
    /// Create a new CSV member repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_members(&self) -> Result<Vec<Member>> {
        let file_path = self.connection.members_file_path();

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut members = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let member = Self::parse_record(&record)
                .with_context(|| format!("corrupt member record in {}", file_path.display()))?;
            members.push(member);
        }

        Ok(members)
    }

    fn parse_record(record: &csv::StringRecord) -> Result<Member> {
        let field = |index: usize| record.get(index).unwrap_or("");

        let status = MemberStatus::parse(field(2))
            .ok_or_else(|| anyhow::anyhow!("unknown member status '{}'", field(2)))?;

        Ok(Member {
            id: field(0).to_string(),
            name: field(1).to_string(),
            status,
            contribution: field(3).parse()?,
            last_reset_cycle: field(4).parse()?,
            created_at: DateTime::parse_from_rfc3339(field(5))?.with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(field(6))?.with_timezone(&Utc),
        })
    }

    fn write_members(&self, members: &[Member]) -> Result<()> {
        let file_path = self.connection.members_file_path();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)?;

        let writer = BufWriter::new(file);
        let mut csv_writer = Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "name",
            "status",
            "contribution",
            "last_reset_cycle",
            "created_at",
            "updated_at",
        ])?;

        for member in members {
            csv_writer.write_record(&[
                member.id.clone(),
                member.name.clone(),
                member.status.as_str().to_string(),
                member.contribution.to_string(),
                member.last_reset_cycle.to_string(),
                member.created_at.to_rfc3339(),
                member.updated_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl MemberStorage for MemberRepository {
    fn store_member(&self, member: &Member) -> Result<()> {
        let _guard = self.connection.lock_for_write();

        let mut members = self.read_members()?;
        if members.iter().any(|m| m.id == member.id) {
            return Err(anyhow::anyhow!("member {} already exists", member.id));
        }

        members.push(member.clone());
        self.write_members(&members)
    }

    fn get_member(&self, member_id: &str) -> Result<Option<Member>> {
        let members = self.read_members()?;
        Ok(members.into_iter().find(|m| m.id == member_id))
    }

    fn list_members(&self) -> Result<Vec<Member>> {
        let mut members = self.read_members()?;
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    fn update_member(&self, member: &Member) -> Result<()> {
        let _guard = self.connection.lock_for_write();

        let mut members = self.read_members()?;
        let Some(existing) = members.iter_mut().find(|m| m.id == member.id) else {
            return Err(anyhow::anyhow!("member {} does not exist", member.id));
        };

        *existing = member.clone();
        self.write_members(&members)
    }

    fn apply_contribution(&self, member_id: &str, amount: f64) -> Result<Option<Member>> {
        let _guard = self.connection.lock_for_write();

        let mut members = self.read_members()?;
        let Some(member) = members.iter_mut().find(|m| m.id == member_id) else {
            return Ok(None);
        };

        member.status = MemberStatus::Verified;
        member.contribution += amount;
        member.updated_at = Utc::now();
        let updated = member.clone();

        self.write_members(&members)?;
        Ok(Some(updated))
    }

    fn reset_members_behind(&self, cycle: u32) -> Result<usize> {
        let _guard = self.connection.lock_for_write();

        let mut members = self.read_members()?;
        let now = Utc::now();
        let mut reset_count = 0;

        for member in members.iter_mut() {
            if member.last_reset_cycle >= cycle {
                continue;
            }
            member.status = MemberStatus::Pending;
            member.contribution = 0.0;
            member.last_reset_cycle = cycle;
            member.updated_at = now;
            reset_count += 1;
        }

        if reset_count > 0 {
            self.write_members(&members)?;
            info!("Reset {} members for cycle {}", reset_count, cycle);
        }

        Ok(reset_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (MemberRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (MemberRepository::new(connection), temp_dir)
    }

    fn test_member(id: &str, name: &str) -> Member {
        Member {
            id: id.to_string(),
            name: name.to_string(),
            status: MemberStatus::Pending,
            contribution: 0.0,
            last_reset_cycle: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_store_and_get_member() {
        let (repo, _temp_dir) = setup_test_repo();

        let member = test_member("member::1", "Abebe");
        repo.store_member(&member).expect("Failed to store member");

        let loaded = repo
            .get_member("member::1")
            .expect("Failed to get member")
            .expect("Member should exist");
        assert_eq!(loaded, member);

        assert!(repo.store_member(&member).is_err(), "duplicate id must be rejected");
    }

    #[test]
    fn test_list_members_sorted_by_name() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_member(&test_member("member::2", "Chaltu")).expect("store");
        repo.store_member(&test_member("member::1", "Abebe")).expect("store");

        let names: Vec<String> = repo
            .list_members()
            .expect("Failed to list members")
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Abebe".to_string(), "Chaltu".to_string()]);
    }

    #[test]
    fn test_apply_contribution_verifies_and_accumulates() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_member(&test_member("member::1", "Abebe")).expect("store");

        let updated = repo
            .apply_contribution("member::1", 5000.0)
            .expect("Failed to apply contribution")
            .expect("Member should exist");
        assert_eq!(updated.status, MemberStatus::Verified);
        assert_eq!(updated.contribution, 5000.0);

        let updated = repo
            .apply_contribution("member::1", 2500.0)
            .expect("Failed to apply contribution")
            .expect("Member should exist");
        assert_eq!(updated.contribution, 7500.0);

        assert!(repo
            .apply_contribution("member::404", 100.0)
            .expect("Failed to run apply")
            .is_none());
    }

    #[test]
    fn test_reset_members_behind_is_idempotent() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_member(&test_member("member::1", "Abebe")).expect("store");
        repo.store_member(&test_member("member::2", "Chaltu")).expect("store");
        repo.apply_contribution("member::1", 5000.0)
            .expect("Failed to apply")
            .expect("exists");

        let reset = repo.reset_members_behind(2).expect("Failed to reset");
        assert_eq!(reset, 2);

        let member = repo
            .get_member("member::1")
            .expect("Failed to get member")
            .expect("Member should exist");
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.contribution, 0.0);
        assert_eq!(member.last_reset_cycle, 2);

        // Running the same reset again changes nothing.
        let reset = repo.reset_members_behind(2).expect("Failed to reset");
        assert_eq!(reset, 0);
    }
}
