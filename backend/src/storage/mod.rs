//! # Storage Module
//!
//! Data persistence for the equb backend.
//!
//! The domain layer depends on the abstractions in [`traits`]; the [`csv`]
//! module is the file-backed implementation currently shipped. Repositories
//! are cheap to clone and share one connection, whose write lock serializes
//! every read-check-write sequence.

pub mod csv;
pub mod traits;

pub use csv::{ClaimRepository, CsvConnection, MemberRepository, SettingsRepository, TicketRepository};
pub use traits::{
    ClaimStorage, ClaimTransition, MemberStorage, SettingsStorage, TicketStorage,
};
