//! # Equb Backend
//!
//! Backend for a member-facing equb (rotating savings and draw) product.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! UI Layer (web/mobile frontend)
//!     ↓
//! IO Layer (REST API, mappers)
//!     ↓
//! Domain Layer (ticket ledger, reconciliation, cycle rollover)
//!     ↓
//! Storage Layer (file-backed repositories)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Assign unique sequential lucky numbers to members within a draw cycle,
//!   correctly under concurrent access
//! - Reconcile payment claims into ticket and member state
//! - Roll cycles over and schedule draws, rendered in the Ethiopian and
//!   Gregorian calendars

pub mod domain;
pub mod io;
pub mod storage;

use axum::http::{HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::{CycleService, MemberService, ReconciliationService, TicketService};
use crate::storage::CsvConnection;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub ticket_service: TicketService,
    pub reconciliation_service: ReconciliationService,
    pub cycle_service: CycleService,
    pub member_service: MemberService,
}

impl AppState {
    /// Build the service graph on top of one storage connection
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self {
            ticket_service: TicketService::new(connection.clone()),
            reconciliation_service: ReconciliationService::new(connection.clone()),
            cycle_service: CycleService::new(connection.clone()),
            member_service: MemberService::new(connection),
        }
    }
}

/// Assemble the application router with CORS for the frontend
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .nest("/api/numbers", io::rest::number_apis::router())
        .nest("/api/claims", io::rest::claim_apis::router())
        .nest("/api/members", io::rest::member_apis::router())
        .nest("/api/draw", io::rest::draw_apis::router())
        .nest("/api/calendar", io::rest::calendar_apis::router())
        .layer(cors)
        .with_state(state)
}
