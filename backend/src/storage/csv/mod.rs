//! # CSV Storage Module
//!
//! File-based storage implementation for the equb backend. The domain layer
//! only sees the storage traits, so this backend is interchangeable with a
//! database implementation.
//!
//! ## Layout
//!
//! ```text
//! data/
//! ├── settings.yaml            ← draw schedule + cycle counter
//! ├── members.csv              ← member directory
//! ├── claims.csv               ← payment claims
//! ├── tickets_cycle_1.csv      ← ticket ledger, one file per cycle
//! └── tickets_cycle_2.csv
//! ```
//!
//! All mutating operations run under the connection's write lock, which is
//! what gives check-then-create on the (cycle, number) keyspace its
//! one-winner guarantee.

pub mod claim_repository;
pub mod connection;
pub mod member_repository;
pub mod settings_repository;
pub mod ticket_repository;

pub use claim_repository::ClaimRepository;
pub use connection::CsvConnection;
pub use member_repository::MemberRepository;
pub use settings_repository::SettingsRepository;
pub use ticket_repository::TicketRepository;
