//! # REST API Interface Layer
//!
//! HTTP endpoints for the equb backend. This layer handles request/response
//! serialization, basic input validation, and translation of domain errors
//! to HTTP status codes; all business rules live in the domain layer.

pub mod calendar_apis;
pub mod claim_apis;
pub mod draw_apis;
pub mod mappers;
pub mod member_apis;
pub mod number_apis;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::errors::EqubError;

/// Map a domain error to its HTTP response.
pub(crate) fn error_response(error: EqubError) -> Response {
    let status = match &error {
        EqubError::InvalidDate(_) => StatusCode::BAD_REQUEST,
        EqubError::NumberTaken { .. } => StatusCode::CONFLICT,
        EqubError::NotFound(_) => StatusCode::NOT_FOUND,
        EqubError::AlreadyProcessed(_) => StatusCode::CONFLICT,
        EqubError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, error.to_string()).into_response()
}
