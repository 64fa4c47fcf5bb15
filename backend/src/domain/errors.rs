//! Error taxonomy for the equb core.
//!
//! Storage-layer failures travel as `anyhow::Error` inside the repositories
//! and are wrapped into `StorageUnavailable` at the service boundary. The
//! remaining variants are local validation/conflict outcomes that are never
//! retried automatically.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EqubError {
    /// Malformed or out-of-range calendar input.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Another pending/active ticket already holds the number.
    #[error("lucky number {number} is already taken in cycle {cycle}")]
    NumberTaken { cycle: u32, number: u32 },

    /// Referenced entity does not exist (or is not in the expected state).
    #[error("{0} not found")]
    NotFound(String),

    /// The claim already reached a terminal state; no side effects repeated.
    #[error("claim {0} has already been processed")]
    AlreadyProcessed(String),

    /// The backing store failed or timed out. Retry is the caller's job.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] anyhow::Error),
}
