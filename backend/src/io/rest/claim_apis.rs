//! # REST API for Payment Claims
//!
//! Endpoints for submitting contribution payments and for the admin review
//! queue (approve/reject).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info};
use shared::SubmitClaimRequest;

use crate::domain::commands::claims::{
    ApproveClaimCommand, RejectClaimCommand, SubmitClaimCommand,
};
use crate::io::rest::error_response;
use crate::io::rest::mappers::claim_mapper::ClaimMapper;
use crate::AppState;

/// Create a router for claim related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_claim))
        .route("/pending", get(get_pending_claims))
        .route("/:id/approve", post(approve_claim))
        .route("/:id/reject", post(reject_claim))
}

/// Submit a contribution payment claim
pub async fn submit_claim(
    State(state): State<AppState>,
    Json(request): Json<SubmitClaimRequest>,
) -> impl IntoResponse {
    info!("POST /api/claims - request: {:?}", request);

    if request.amount <= 0.0 {
        return (StatusCode::BAD_REQUEST, "Contribution amount must be positive").into_response();
    }
    if request.requested_number == Some(0) {
        return (StatusCode::BAD_REQUEST, "Lucky number must be at least 1").into_response();
    }

    let command = SubmitClaimCommand {
        member_id: request.user_id,
        amount: request.amount,
        requested_number: request.requested_number,
    };

    match state.reconciliation_service.submit_claim(command) {
        Ok(claim) => {
            (StatusCode::CREATED, Json(ClaimMapper::to_submit_response(claim))).into_response()
        }
        Err(e) => {
            error!("Failed to submit claim: {}", e);
            error_response(e)
        }
    }
}

/// Get the admin review queue of pending claims
pub async fn get_pending_claims(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/claims/pending");

    match state.reconciliation_service.pending_claims() {
        Ok(claims) => {
            (StatusCode::OK, Json(ClaimMapper::to_pending_response(claims))).into_response()
        }
        Err(e) => {
            error!("Failed to list pending claims: {}", e);
            error_response(e)
        }
    }
}

/// Approve a pending claim
pub async fn approve_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/claims/{}/approve", claim_id);

    let command = ApproveClaimCommand { claim_id };

    match state.reconciliation_service.approve(command) {
        Ok(result) => {
            (StatusCode::OK, Json(ClaimMapper::to_approve_response(result))).into_response()
        }
        Err(e) => {
            error!("Failed to approve claim: {}", e);
            error_response(e)
        }
    }
}

/// Reject a pending claim
pub async fn reject_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/claims/{}/reject", claim_id);

    let command = RejectClaimCommand { claim_id };

    match state.reconciliation_service.reject(command) {
        Ok(result) => {
            (StatusCode::OK, Json(ClaimMapper::to_reject_response(result))).into_response()
        }
        Err(e) => {
            error!("Failed to reject claim: {}", e);
            error_response(e)
        }
    }
}
