//! # REST API for the Draw Schedule
//!
//! Endpoints for the dashboard countdown and the admin cycle rollover.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info};

use crate::io::rest::error_response;
use crate::io::rest::mappers::draw_mapper::DrawMapper;
use crate::AppState;

/// Create a router for draw schedule APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_draw_schedule))
        .route("/advance", post(advance_cycle))
}

/// Get the current draw schedule and countdown
pub async fn get_draw_schedule(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/draw");

    match state.cycle_service.draw_schedule() {
        Ok(schedule) => {
            (StatusCode::OK, Json(DrawMapper::to_schedule_response(schedule))).into_response()
        }
        Err(e) => {
            error!("Failed to read draw schedule: {}", e);
            error_response(e)
        }
    }
}

/// Close the current cycle and open the next one
pub async fn advance_cycle(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/draw/advance");

    match state.cycle_service.advance() {
        Ok(result) => {
            (StatusCode::OK, Json(DrawMapper::to_advance_response(result))).into_response()
        }
        Err(e) => {
            error!("Failed to advance cycle: {}", e);
            error_response(e)
        }
    }
}
