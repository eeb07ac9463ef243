use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::seat::SeatSet;
use super::trip::TripRef;

/// Статус записи о бронировании, как его присылает бэкенд.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Processing,
    Confirmed,
    Cancelled,
    Freezed,
    #[default]
    Unknown,
}

impl BookingStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" => BookingStatus::Processing,
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" | "canceled" => BookingStatus::Cancelled,
            "freezed" | "frozen" => BookingStatus::Freezed,
            _ => BookingStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Processing => "processing",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Freezed => "freezed",
            BookingStatus::Unknown => "unknown",
        }
    }
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = super::loose::string(deserializer)?;
        Ok(raw.as_deref().map(BookingStatus::from_wire).unwrap_or_default())
    }
}

impl Serialize for BookingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Общий взгляд на любую запись, занимающую места на рейсе.
pub trait SeatHolder {
    fn trip(&self) -> &TripRef;
    fn seats(&self) -> &SeatSet;
    fn status(&self) -> BookingStatus;
}

/// Бронирование зарегистрированного пользователя или агента.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default, deserialize_with = "super::loose::string")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub trip: TripRef,
    #[serde(default)]
    pub seat_no: SeatSet,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "super::loose::number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub serial_no: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub agent_id: Option<String>,
}

/// Бронирование без учётной записи, идентифицируется телефоном/именем.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestBooking {
    #[serde(default, deserialize_with = "super::loose::string")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub trip: TripRef,
    #[serde(default)]
    pub seat_no: SeatSet,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "super::loose::number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub serial_no: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub phone: Option<String>,
}

/// Места, заблокированные персоналом административно.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrozenSeat {
    #[serde(default, deserialize_with = "super::loose::string")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub trip: TripRef,
    #[serde(default)]
    pub seat_no: SeatSet,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub frozen_by: Option<String>,
}

/// Запись об отмене: исходные места исключаются из расчёта статусов.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    #[serde(default, deserialize_with = "super::loose::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub booking_id: Option<String>,
    #[serde(flatten)]
    pub trip: TripRef,
    #[serde(default)]
    pub seat_no: SeatSet,
    #[serde(default)]
    pub reserved_tickets: SeatSet,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "super::loose::string")]
    pub cancelled_at: Option<String>,
}

impl SeatHolder for Booking {
    fn trip(&self) -> &TripRef {
        &self.trip
    }

    fn seats(&self) -> &SeatSet {
        &self.seat_no
    }

    fn status(&self) -> BookingStatus {
        self.status
    }
}

impl SeatHolder for GuestBooking {
    fn trip(&self) -> &TripRef {
        &self.trip
    }

    fn seats(&self) -> &SeatSet {
        &self.seat_no
    }

    fn status(&self) -> BookingStatus {
        self.status
    }
}

impl SeatHolder for FrozenSeat {
    fn trip(&self) -> &TripRef {
        &self.trip
    }

    fn seats(&self) -> &SeatSet {
        &self.seat_no
    }

    fn status(&self) -> BookingStatus {
        BookingStatus::Freezed
    }
}

impl SeatHolder for Cancellation {
    fn trip(&self) -> &TripRef {
        &self.trip
    }

    // seat_no приоритетнее, reserved_tickets - запасной вариант
    fn seats(&self) -> &SeatSet {
        if self.seat_no.is_empty() {
            &self.reserved_tickets
        } else {
            &self.seat_no
        }
    }

    fn status(&self) -> BookingStatus {
        BookingStatus::Cancelled
    }
}

/// Четыре коллекции одного рейса, полученные от бэкенда.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripRecords {
    pub bookings: Vec<Booking>,
    pub guest_bookings: Vec<GuestBooking>,
    pub frozen_seats: Vec<FrozenSeat>,
    pub cancellations: Vec<Cancellation>,
}
