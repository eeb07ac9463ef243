use chrono::NaiveDate;

use crate::models::{Bus, Session, TripRecords, TripSelector};
use crate::AppState;

use super::backend::BackendError;

/// Всё, что нужно для расчёта карты мест одного рейса.
#[derive(Debug, Clone)]
pub struct TripSnapshot {
    pub bus: Bus,
    pub selector: TripSelector,
    pub records: TripRecords,
}

pub async fn load_trip(
    state: &AppState,
    session: &Session,
    bus_id: &str,
    date: NaiveDate,
) -> Result<TripSnapshot, BackendError> {
    let bus = state.cache.get_bus(session, bus_id).await?;
    let records = state.backend.fetch_trip_records(session, bus_id, date).await?;

    let mut selector = TripSelector::new(date).with_bus_id(bus.id.clone().unwrap_or_else(|| bus_id.to_string()));
    if let Some(bus_no) = &bus.bus_no {
        selector = selector.with_bus_no(bus_no.clone());
    }

    Ok(TripSnapshot { bus, selector, records })
}
