use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Поля рейса, общие для бронирований, гостевых броней, заморозок и отмен.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRef {
    #[serde(default, deserialize_with = "super::loose::string")]
    pub bus_id: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub bus_no: Option<String>,
    #[serde(default, alias = "departureDate", deserialize_with = "super::loose::string")]
    pub departure_date: Option<String>,
}

impl TripRef {
    pub fn departure_day(&self) -> Option<NaiveDate> {
        self.departure_date.as_deref().and_then(parse_day)
    }
}

/// Календарный день из `2025-06-15` или `2025-06-15T08:30:00.000Z`.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Выбранный рейс: автобус (по id и/или номеру) и дата отправления.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSelector {
    pub bus_id: Option<String>,
    pub bus_no: Option<String>,
    pub date: NaiveDate,
}

impl TripSelector {
    pub fn new(date: NaiveDate) -> Self {
        Self { bus_id: None, bus_no: None, date }
    }

    pub fn with_bus_id(mut self, bus_id: impl Into<String>) -> Self {
        self.bus_id = Some(bus_id.into());
        self
    }

    pub fn with_bus_no(mut self, bus_no: impl Into<String>) -> Self {
        self.bus_no = Some(bus_no.into());
        self
    }

    pub fn matches(&self, trip: &TripRef) -> bool {
        if !self.matches_bus(trip) {
            return false;
        }
        match trip.departure_day() {
            Some(day) => day == self.date,
            None => {
                tracing::debug!(
                    "Skipping record with unparseable departure date {:?}",
                    trip.departure_date
                );
                false
            }
        }
    }

    fn matches_bus(&self, trip: &TripRef) -> bool {
        let same = |wanted: &Option<String>, actual: &Option<String>| match (wanted, actual) {
            (Some(w), Some(a)) => w.trim() == a.trim(),
            _ => false,
        };
        same(&self.bus_id, &trip.bus_id) || same(&self.bus_no, &trip.bus_no)
    }
}
