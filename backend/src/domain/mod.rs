//! # Domain Module
//!
//! Business logic for the equb backend. Everything here is storage-backend
//! and UI agnostic.
//!
//! ## Module Organization
//!
//! - **ticket_service**: the ticket ledger: reservation, confirmation,
//!   release, free-number scans, the number board
//! - **reconciliation_service**: turns payment-claim approvals/rejections
//!   into ticket and member state changes
//! - **cycle_service**: cycle rollover and draw scheduling
//! - **member_service**: member directory and dashboard overview
//! - **ethiopian_calendar**: pure Ethiopian↔Gregorian date conversion
//! - **capacity**: rolling growth of the selectable number range
//! - **models**: domain entities (tickets, members, claims, draw settings)
//! - **commands**: internal command/query types consumed by the services
//! - **errors**: the error taxonomy shared by all services
//!
//! ## Core Rules
//!
//! - A lucky number is held by at most one pending/active ticket per cycle
//! - Void tickets never block a number; superseded cycles keep their ledgers
//!   as history
//! - A claim reaches a terminal state exactly once; repeats are refused
//! - The member's lucky number is derived from the ledger, never stored

pub mod capacity;
pub mod commands;
pub mod cycle_service;
pub mod errors;
pub mod ethiopian_calendar;
pub mod member_service;
pub mod models;
pub mod reconciliation_service;
pub mod ticket_service;

pub use cycle_service::CycleService;
pub use errors::EqubError;
pub use member_service::MemberService;
pub use reconciliation_service::ReconciliationService;
pub use ticket_service::TicketService;
