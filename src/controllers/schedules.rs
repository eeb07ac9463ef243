use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::models::{Action, Module, Session};
use crate::services::dates::prioritize_dates;
use crate::AppState;

use super::{authorize, backend_error, BusPath, parse_date, validate_iso_date, validation_error};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/buses/{bus_id}/dates", get(get_bus_dates))
}

// GET /api/buses/{bus_id}/dates?today=YYYY-MM-DD
#[derive(Debug, Deserialize, Validate)]
struct DatesQuery {
    // Клиент может передать свой "сегодня" (часовой пояс кассы)
    #[validate(custom(function = "validate_iso_date"))]
    today: Option<String>,
}

#[derive(Debug, Serialize)]
struct DatesResponse {
    bus_id: String,
    today: NaiveDate,
    default_date: Option<NaiveDate>,
    dates: Vec<NaiveDate>,
}

async fn get_bus_dates(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(path): Path<BusPath>,
    Query(params): Query<DatesQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    authorize(&session, Module::Schedules, Action::View)?;
    path.validate().map_err(validation_error)?;
    params.validate().map_err(validation_error)?;
    let bus_id = path.bus_id;

    let today = match params.today.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => chrono::Local::now().date_naive(),
    };

    let raw_dates = state
        .cache
        .get_schedule_dates(&session, &bus_id)
        .await
        .map_err(|e| backend_error("get_bus_dates", e))?;

    let dates = prioritize_dates(&raw_dates, today);

    Ok((
        StatusCode::OK,
        Json(DatesResponse {
            bus_id,
            today,
            default_date: dates.first().copied(),
            dates,
        }),
    ))
}
