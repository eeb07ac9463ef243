use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use validator::Validate;

use crate::models::{Action, Module, SeatStatus, Session};
use crate::services::{reconciler::reconcile, trips::load_trip};
use crate::AppState;

use super::{authorize_any, backend_error, BusPath, parse_date, validate_iso_date, validation_error};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/buses/{bus_id}/seat-map", get(get_seat_map))
}

// GET /api/buses/{bus_id}/seat-map?date=YYYY-MM-DD
#[derive(Debug, Deserialize, Validate)]
struct SeatMapQuery {
    #[validate(custom(function = "validate_iso_date"))]
    date: String,
}

#[derive(Debug, Serialize)]
struct SeatMapResponse {
    bus_id: String,
    bus_no: Option<String>,
    date: chrono::NaiveDate,
    total_seats: u32,
    seats: BTreeMap<u32, SeatStatus>,
    frozen_over_booked: BTreeSet<u32>,
}

async fn get_seat_map(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(path): Path<BusPath>,
    Query(params): Query<SeatMapQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Гостю карта нужна, чтобы выбрать место
    authorize_any(
        &session,
        &[
            (Module::Bookings, Action::View),
            (Module::Buses, Action::View),
            (Module::GuestBookings, Action::Create),
        ],
    )?;
    path.validate().map_err(validation_error)?;
    params.validate().map_err(validation_error)?;
    let bus_id = path.bus_id;
    let date = parse_date(&params.date)?;

    let trip = load_trip(&state, &session, &bus_id, date)
        .await
        .map_err(|e| backend_error("get_seat_map", e))?;

    let map = reconcile(trip.bus.total_seats, &trip.selector, &trip.records);

    Ok((
        StatusCode::OK,
        Json(SeatMapResponse {
            bus_id,
            bus_no: trip.bus.bus_no,
            date,
            total_seats: trip.bus.total_seats,
            seats: map.seats,
            frozen_over_booked: map.frozen_over_booked,
        }),
    ))
}
