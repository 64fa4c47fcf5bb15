//! # REST API for Member Management
//!
//! Endpoints for registering members and the member dashboard overview.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};
use shared::CreateMemberRequest;

use crate::domain::commands::members::CreateMemberCommand;
use crate::io::rest::error_response;
use crate::io::rest::mappers::member_mapper::MemberMapper;
use crate::AppState;

/// Create a router for member related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/:id", get(get_member_overview))
}

/// Register a new member
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/members - request: {:?}", request);

    if request.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Member name cannot be empty").into_response();
    }

    let command = CreateMemberCommand { name: request.name };

    match state.member_service.create_member(command) {
        Ok(member) => {
            (StatusCode::CREATED, Json(MemberMapper::to_member_response(member))).into_response()
        }
        Err(e) => {
            error!("Failed to create member: {}", e);
            error_response(e)
        }
    }
}

/// List all members
pub async fn list_members(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/members");

    match state.member_service.list_members() {
        Ok(members) => {
            (StatusCode::OK, Json(MemberMapper::to_list_response(members))).into_response()
        }
        Err(e) => {
            error!("Failed to list members: {}", e);
            error_response(e)
        }
    }
}

/// Get one member's dashboard overview (directory record + derived lucky
/// number)
pub async fn get_member_overview(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/members/{}", member_id);

    match state.member_service.member_overview(&member_id) {
        Ok(overview) => {
            (StatusCode::OK, Json(MemberMapper::to_overview_response(overview))).into_response()
        }
        Err(e) => {
            error!("Failed to build member overview: {}", e);
            error_response(e)
        }
    }
}
