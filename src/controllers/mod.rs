pub mod schedules;
pub mod seats;
#[cfg(feature = "reports")]
pub mod reports;

use axum::{http::StatusCode, Router};
use chrono::NaiveDate;
use std::sync::Arc;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::{Action, Module, Session};
use crate::services::backend::BackendError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    let router = Router::new()
        .merge(seats::routes())
        .merge(schedules::routes());

    #[cfg(feature = "reports")]
    let router = router.merge(reports::routes());

    router
}

/* ---------- helpers ---------- */

pub(crate) fn authorize(session: &Session, module: Module, action: Action) -> Result<(), (StatusCode, String)> {
    if session.allows(module, action) {
        Ok(())
    } else {
        tracing::warn!(
            "User {} ({:?}) denied {:?} on {:?}",
            session.user.id, session.user.role, action, module
        );
        Err((StatusCode::FORBIDDEN, "Недостаточно прав".to_string()))
    }
}

/// Пропускает, если разрешено хотя бы одно из действий.
pub(crate) fn authorize_any(session: &Session, rights: &[(Module, Action)]) -> Result<(), (StatusCode, String)> {
    if rights.iter().any(|(module, action)| session.allows(*module, *action)) {
        Ok(())
    } else {
        tracing::warn!("User {} ({:?}) denied {:?}", session.user.id, session.user.role, rights);
        Err((StatusCode::FORBIDDEN, "Недостаточно прав".to_string()))
    }
}

pub(crate) fn backend_error(context: &str, e: BackendError) -> (StatusCode, String) {
    match e {
        BackendError::NotFound { path } => {
            tracing::debug!("{}: backend has no {}", context, path);
            (StatusCode::NOT_FOUND, "Не найдено".to_string())
        }
        BackendError::CircuitOpen => {
            (StatusCode::SERVICE_UNAVAILABLE, "Сервис бронирования временно недоступен".to_string())
        }
        BackendError::Status { status, .. }
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
        {
            (status, "Доступ запрещён".to_string())
        }
        e => {
            tracing::error!("{}: {:?}", context, e);
            (StatusCode::BAD_GATEWAY, "Ошибка сервиса бронирования".to_string())
        }
    }
}

// Идентификатор автобуса подставляется в путь бэкенда и ключ кеша
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct BusPath {
    #[validate(length(min = 1, max = 64), custom(function = "validate_bus_id"))]
    pub bus_id: String,
}

pub(crate) fn validate_bus_id(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        Ok(())
    } else {
        Err(ValidationError::new("bus_id"))
    }
}

pub(crate) fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ValidationError::new("iso_date"))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, (StatusCode, String)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| (StatusCode::BAD_REQUEST, "date должна быть в формате YYYY-MM-DD".to_string()))
}

pub(crate) fn validation_error(e: validator::ValidationErrors) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("Некорректные параметры: {}", e))
}
