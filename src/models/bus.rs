use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    #[serde(default, deserialize_with = "super::loose::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub bus_no: Option<String>,
    #[serde(alias = "totalSeats", deserialize_with = "super::loose::count")]
    pub total_seats: u32,
}

/// Рейс из расписания автобуса. Нужен только ради списка дат.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, deserialize_with = "super::loose::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub bus_id: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub bus_no: Option<String>,
    #[serde(
        default,
        alias = "departureDate",
        alias = "date",
        deserialize_with = "super::loose::string"
    )]
    pub departure_date: Option<String>,
}
