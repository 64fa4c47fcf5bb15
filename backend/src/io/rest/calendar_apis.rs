//! # REST API for Calendar Conversion
//!
//! Endpoints the UI uses to translate dates between the Gregorian and
//! Ethiopian calendars.

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use serde::Deserialize;

use crate::domain::ethiopian_calendar;
use crate::io::rest::error_response;
use crate::io::rest::mappers::draw_mapper::DrawMapper;
use crate::AppState;

/// Create a router for calendar conversion APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/to-ethiopian", get(to_ethiopian))
        .route("/to-gregorian", get(to_gregorian))
}

#[derive(Debug, Deserialize)]
pub struct ToEthiopianQuery {
    /// Gregorian date, ISO 8601 (YYYY-MM-DD)
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct ToGregorianQuery {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Convert a Gregorian date to its Ethiopian equivalent
pub async fn to_ethiopian(Query(query): Query<ToEthiopianQuery>) -> impl IntoResponse {
    info!("GET /api/calendar/to-ethiopian?date={}", query.date);

    let date = match ethiopian_calendar::parse_gregorian(&query.date) {
        Ok(date) => date,
        Err(e) => return error_response(e),
    };

    let ethiopian = ethiopian_calendar::to_ethiopian(date);
    (StatusCode::OK, Json(DrawMapper::ethiopian_to_dto(ethiopian))).into_response()
}

/// Convert an Ethiopian date to its Gregorian equivalent
pub async fn to_gregorian(Query(query): Query<ToGregorianQuery>) -> impl IntoResponse {
    info!(
        "GET /api/calendar/to-gregorian?year={}&month={}&day={}",
        query.year, query.month, query.day
    );

    match ethiopian_calendar::to_gregorian(query.year, query.month, query.day) {
        Ok(date) => (StatusCode::OK, Json(date.to_string())).into_response(),
        Err(e) => error_response(e),
    }
}
