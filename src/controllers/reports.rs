//! reports.rs
//!
//! Сводный отчёт по рейсу: места по статусам, подтверждённые брони, выручка.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::models::{Action, Module, Session};
use crate::services::{report::seat_report, trips::load_trip};
use crate::AppState;

use super::{authorize, backend_error, parse_date, validate_bus_id, validate_iso_date, validation_error};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/seats", get(get_seat_report))
}

/// GET /api/reports/seats?bus_id=..&date=YYYY-MM-DD
#[derive(Debug, Deserialize, Validate)]
struct ReportQuery {
    #[validate(length(min = 1, max = 64), custom(function = "validate_bus_id"))]
    bus_id: String,
    #[validate(custom(function = "validate_iso_date"))]
    date: String,
}

async fn get_seat_report(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<ReportQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    authorize(&session, Module::Reports, Action::View)?;
    params.validate().map_err(validation_error)?;
    let date = parse_date(&params.date)?;

    let trip = load_trip(&state, &session, &params.bus_id, date)
        .await
        .map_err(|e| backend_error("get_seat_report", e))?;

    let report = seat_report(trip.bus.total_seats, &trip.selector, &trip.records);

    Ok((StatusCode::OK, Json(report)))
}
