//! # REST API for the Number Board
//!
//! Endpoints for viewing the selectable number range and reserving a lucky
//! number.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use log::{error, info};
use shared::ReserveNumberRequest;

use crate::domain::commands::tickets::ReserveNumberCommand;
use crate::io::rest::error_response;
use crate::io::rest::mappers::ticket_mapper::TicketMapper;
use crate::AppState;

/// Create a router for number board APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/board", get(get_number_board))
        .route("/reserve", post(reserve_number))
        .route("/tickets/:id", delete(release_ticket))
}

/// Get the number board for the current cycle
pub async fn get_number_board(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/numbers/board");

    let cycle = match state.cycle_service.current_cycle() {
        Ok(cycle) => cycle,
        Err(e) => {
            error!("Failed to read current cycle: {}", e);
            return error_response(e);
        }
    };

    match state.ticket_service.number_board(cycle) {
        Ok(board) => {
            (StatusCode::OK, Json(TicketMapper::to_board_response(board))).into_response()
        }
        Err(e) => {
            error!("Failed to build number board: {}", e);
            error_response(e)
        }
    }
}

/// Reserve a specific lucky number for a member
pub async fn reserve_number(
    State(state): State<AppState>,
    Json(request): Json<ReserveNumberRequest>,
) -> impl IntoResponse {
    info!("POST /api/numbers/reserve - request: {:?}", request);

    if request.number == 0 {
        return (StatusCode::BAD_REQUEST, "Lucky number must be at least 1").into_response();
    }

    let cycle = match state.cycle_service.current_cycle() {
        Ok(cycle) => cycle,
        Err(e) => {
            error!("Failed to read current cycle: {}", e);
            return error_response(e);
        }
    };

    let command = ReserveNumberCommand {
        cycle,
        number: request.number,
        member_id: request.user_id,
    };

    match state.ticket_service.reserve(command) {
        Ok(ticket) => {
            (StatusCode::CREATED, Json(TicketMapper::to_reserve_response(ticket))).into_response()
        }
        Err(e) => {
            error!("Failed to reserve number: {}", e);
            error_response(e)
        }
    }
}

/// Release a ticket (admin), freeing its number for the current cycle
pub async fn release_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/numbers/tickets/{}", ticket_id);

    let cycle = match state.cycle_service.current_cycle() {
        Ok(cycle) => cycle,
        Err(e) => {
            error!("Failed to read current cycle: {}", e);
            return error_response(e);
        }
    };

    match state.ticket_service.release(cycle, &ticket_id) {
        Ok(ticket) => (StatusCode::OK, Json(TicketMapper::to_dto(ticket))).into_response(),
        Err(e) => {
            error!("Failed to release ticket: {}", e);
            error_response(e)
        }
    }
}
