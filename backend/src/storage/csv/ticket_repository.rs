use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, Writer};
use log::debug;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::time::{SystemTime, UNIX_EPOCH};

use super::connection::CsvConnection;
use crate::domain::models::ticket::{AssignedBy, Ticket, TicketState};
use crate::storage::traits::TicketStorage;

/// CSV-based ticket ledger repository. One file per cycle
/// (`tickets_cycle_<n>.csv`), so superseded cycles stay behind as history
/// and never collide with the current numbering.
///
/// Every mutating operation performs its read-check-write sequence while
/// holding the connection's write lock; two racing callers targeting the
/// same (cycle, number) slot get exactly one success.
#[derive(Clone)]
pub struct TicketRepository {
    connection: CsvConnection,
}

impl TicketRepository {
    /// Create a new CSV ticket repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all tickets recorded for a cycle
    fn read_tickets(&self, cycle: u32) -> Result<Vec<Ticket>> {
        let file_path = self.connection.tickets_file_path(cycle);

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut tickets = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let ticket = Self::parse_record(&record)
                .with_context(|| format!("corrupt ticket record in {}", file_path.display()))?;
            tickets.push(ticket);
        }

        Ok(tickets)
    }

    fn parse_record(record: &csv::StringRecord) -> Result<Ticket> {
        let field = |index: usize| record.get(index).unwrap_or("");

        let state = TicketState::parse(field(5))
            .ok_or_else(|| anyhow::anyhow!("unknown ticket status '{}'", field(5)))?;
        let assigned_by = AssignedBy::parse(field(7))
            .ok_or_else(|| anyhow::anyhow!("unknown ticket origin '{}'", field(7)))?;

        let assigned_date = match field(6) {
            "" => None,
            value => Some(NaiveDate::parse_from_str(value, "%Y-%m-%d")?),
        };
        let created_at = DateTime::parse_from_rfc3339(field(8))?.with_timezone(&Utc);

        Ok(Ticket {
            id: field(0).to_string(),
            number: field(1).parse()?,
            cycle: field(2).parse()?,
            owner_id: field(3).to_string(),
            owner_name: field(4).to_string(),
            state,
            assigned_by,
            assigned_date,
            created_at,
        })
    }

    /// Write all tickets for a cycle back to its CSV file
    fn write_tickets(&self, cycle: u32, tickets: &[Ticket]) -> Result<()> {
        let file_path = self.connection.tickets_file_path(cycle);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)?;

        let writer = BufWriter::new(file);
        let mut csv_writer = Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "ticket_number",
            "cycle",
            "user_id",
            "user_name",
            "status",
            "assigned_date",
            "assigned_by",
            "created_at",
        ])?;

        for ticket in tickets {
            csv_writer.write_record(&[
                ticket.id.clone(),
                ticket.number.to_string(),
                ticket.cycle.to_string(),
                ticket.owner_id.clone(),
                ticket.owner_name.clone(),
                ticket.state.as_str().to_string(),
                ticket.assigned_date.map(|d| d.to_string()).unwrap_or_default(),
                ticket.assigned_by.as_str().to_string(),
                ticket.created_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn smallest_free_number(tickets: &[Ticket]) -> u32 {
        let held: HashSet<u32> = tickets
            .iter()
            .filter(|t| t.state.holds_number())
            .map(|t| t.number)
            .collect();

        let mut candidate = 1;
        while held.contains(&candidate) {
            candidate += 1;
        }
        candidate
    }

    fn epoch_millis() -> Result<u64> {
        Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64)
    }
}

impl TicketStorage for TicketRepository {
    fn create_ticket_if_free(&self, ticket: &Ticket) -> Result<Option<Ticket>> {
        let _guard = self.connection.lock_for_write();

        let mut tickets = self.read_tickets(ticket.cycle)?;
        let taken = tickets
            .iter()
            .any(|t| t.number == ticket.number && t.state.holds_number());
        if taken {
            debug!(
                "Number {} in cycle {} is already held, rejecting create",
                ticket.number, ticket.cycle
            );
            return Ok(None);
        }

        tickets.push(ticket.clone());
        self.write_tickets(ticket.cycle, &tickets)?;
        Ok(Some(ticket.clone()))
    }

    fn create_ticket_at_next_available(
        &self,
        cycle: u32,
        owner_id: &str,
        owner_name: &str,
        state: TicketState,
        assigned_by: AssignedBy,
        assigned_date: Option<NaiveDate>,
    ) -> Result<Ticket> {
        let _guard = self.connection.lock_for_write();

        let mut tickets = self.read_tickets(cycle)?;
        let number = Self::smallest_free_number(&tickets);

        let ticket = Ticket {
            id: Ticket::generate_id(Self::epoch_millis()?),
            number,
            cycle,
            owner_id: owner_id.to_string(),
            owner_name: owner_name.to_string(),
            state,
            assigned_by,
            assigned_date,
            created_at: Utc::now(),
        };

        tickets.push(ticket.clone());
        self.write_tickets(cycle, &tickets)?;
        Ok(ticket)
    }

    fn get_ticket(&self, cycle: u32, ticket_id: &str) -> Result<Option<Ticket>> {
        let tickets = self.read_tickets(cycle)?;
        Ok(tickets.into_iter().find(|t| t.id == ticket_id))
    }

    fn find_holder(&self, cycle: u32, number: u32) -> Result<Option<Ticket>> {
        let tickets = self.read_tickets(cycle)?;
        Ok(tickets
            .into_iter()
            .find(|t| t.number == number && t.state.holds_number()))
    }

    fn list_tickets(&self, cycle: u32) -> Result<Vec<Ticket>> {
        self.read_tickets(cycle)
    }

    fn confirm_if_pending(
        &self,
        cycle: u32,
        ticket_id: &str,
        assigned_by: AssignedBy,
        assigned_date: NaiveDate,
    ) -> Result<Option<Ticket>> {
        let _guard = self.connection.lock_for_write();

        let mut tickets = self.read_tickets(cycle)?;
        let Some(ticket) = tickets
            .iter_mut()
            .find(|t| t.id == ticket_id && t.state == TicketState::Pending)
        else {
            return Ok(None);
        };

        ticket.state = TicketState::Active;
        ticket.assigned_by = assigned_by;
        ticket.assigned_date = Some(assigned_date);
        let confirmed = ticket.clone();

        self.write_tickets(cycle, &tickets)?;
        Ok(Some(confirmed))
    }

    fn release_ticket(
        &self,
        cycle: u32,
        ticket_id: &str,
        assigned_date: NaiveDate,
    ) -> Result<Option<Ticket>> {
        let _guard = self.connection.lock_for_write();

        let mut tickets = self.read_tickets(cycle)?;
        let Some(ticket) = tickets.iter_mut().find(|t| t.id == ticket_id) else {
            return Ok(None);
        };

        if ticket.state == TicketState::Void {
            return Ok(Some(ticket.clone()));
        }

        ticket.state = TicketState::Void;
        ticket.assigned_date = Some(assigned_date);
        let released = ticket.clone();

        self.write_tickets(cycle, &tickets)?;
        Ok(Some(released))
    }

    fn next_available_number(&self, cycle: u32) -> Result<u32> {
        let tickets = self.read_tickets(cycle)?;
        Ok(Self::smallest_free_number(&tickets))
    }

    fn active_count_for_cycle(&self, cycle: u32) -> Result<u32> {
        let tickets = self.read_tickets(cycle)?;
        Ok(tickets.iter().filter(|t| t.state == TicketState::Active).count() as u32)
    }

    fn find_active_ticket(&self, cycle: u32, member_id: &str) -> Result<Option<Ticket>> {
        let tickets = self.read_tickets(cycle)?;
        Ok(tickets
            .into_iter()
            .find(|t| t.owner_id == member_id && t.state == TicketState::Active))
    }
}
