use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::payment_claim::{ClaimStatus, PaymentClaim};
use crate::storage::traits::{ClaimStorage, ClaimTransition};

/// CSV-based payment claim repository (`claims.csv`).
#[derive(Clone)]
pub struct ClaimRepository {
    connection: CsvConnection,
}

impl ClaimRepository {
    /// Create a new CSV claim repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_claims(&self) -> Result<Vec<PaymentClaim>> {
        let file_path = self.connection.claims_file_path();

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut claims = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let claim = Self::parse_record(&record)
                .with_context(|| format!("corrupt claim record in {}", file_path.display()))?;
            claims.push(claim);
        }

        Ok(claims)
    }

    fn parse_record(record: &csv::StringRecord) -> Result<PaymentClaim> {
        let field = |index: usize| record.get(index).unwrap_or("");

        let status = ClaimStatus::parse(field(5))
            .ok_or_else(|| anyhow::anyhow!("unknown claim status '{}'", field(5)))?;

        let requested_number = match field(3) {
            "" => None,
            value => Some(value.parse()?),
        };
        let processed_at = match field(7) {
            "" => None,
            value => Some(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc)),
        };

        Ok(PaymentClaim {
            id: field(0).to_string(),
            member_id: field(1).to_string(),
            amount: field(2).parse()?,
            requested_number,
            cycle: field(4).parse()?,
            status,
            created_at: DateTime::parse_from_rfc3339(field(6))?.with_timezone(&Utc),
            processed_at,
        })
    }

    fn write_claims(&self, claims: &[PaymentClaim]) -> Result<()> {
        let file_path = self.connection.claims_file_path();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)?;

        let writer = BufWriter::new(file);
        let mut csv_writer = Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "member_id",
            "amount",
            "requested_number",
            "cycle",
            "status",
            "created_at",
            "processed_at",
        ])?;

        for claim in claims {
            csv_writer.write_record(&[
                claim.id.clone(),
                claim.member_id.clone(),
                claim.amount.to_string(),
                claim.requested_number.map(|n| n.to_string()).unwrap_or_default(),
                claim.cycle.to_string(),
                claim.status.as_str().to_string(),
                claim.created_at.to_rfc3339(),
                claim.processed_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl ClaimStorage for ClaimRepository {
    fn store_claim(&self, claim: &PaymentClaim) -> Result<()> {
        let _guard = self.connection.lock_for_write();

        let mut claims = self.read_claims()?;
        if claims.iter().any(|c| c.id == claim.id) {
            return Err(anyhow::anyhow!("claim {} already exists", claim.id));
        }

        claims.push(claim.clone());
        self.write_claims(&claims)
    }

    fn get_claim(&self, claim_id: &str) -> Result<Option<PaymentClaim>> {
        let claims = self.read_claims()?;
        Ok(claims.into_iter().find(|c| c.id == claim_id))
    }

    fn list_claims_by_status(&self, status: ClaimStatus) -> Result<Vec<PaymentClaim>> {
        let mut claims = self.read_claims()?;
        claims.retain(|c| c.status == status);
        claims.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(claims)
    }

    fn transition_claim_if_pending(
        &self,
        claim_id: &str,
        to: ClaimStatus,
        processed_at: DateTime<Utc>,
    ) -> Result<ClaimTransition> {
        let _guard = self.connection.lock_for_write();

        let mut claims = self.read_claims()?;
        let Some(claim) = claims.iter_mut().find(|c| c.id == claim_id) else {
            return Ok(ClaimTransition::NotFound);
        };

        if claim.status.is_terminal() {
            return Ok(ClaimTransition::AlreadyProcessed(claim.clone()));
        }

        claim.status = to;
        claim.processed_at = Some(processed_at);
        let transitioned = claim.clone();

        self.write_claims(&claims)?;
        Ok(ClaimTransition::Applied(transitioned))
    }
}
