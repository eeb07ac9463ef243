//! reconciler.rs
//!
//! Сведение статусов мест для одного рейса.
//!
//! Порядок применения записей важен:
//! 1.  Все места `1..=total_seats` свободны.
//! 2.  Места из отмен рейса исключаются из дальнейшего расчёта.
//! 3.  Бронирования, затем гостевые брони: побеждает последняя запись.
//! 4.  Заморозки перезаписывают всё, кроме отменённых мест.
//!
//! Функция чистая и никогда не падает: битые записи просто не влияют на карту.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::models::{BookingStatus, Cancellation, SeatHolder, SeatStatus, SeatStatusMap, TripRecords, TripSelector};

/// Строит карту статусов мест для выбранного автобуса и даты.
pub fn reconcile(total_seats: u32, trip: &TripSelector, records: &TripRecords) -> SeatStatusMap {
    let mut map = SeatStatusMap::all_available(total_seats);
    let cancelled = cancelled_seats(trip, &records.cancellations);

    let booked = records
        .bookings
        .iter()
        .map(|b| b as &dyn SeatHolder)
        .chain(records.guest_bookings.iter().map(|g| g as &dyn SeatHolder));

    for record in booked.filter(|r| trip.matches(r.trip())) {
        let Some(status) = booking_seat_status(record.status()) else {
            debug!("Ignoring booking with status {}", record.status().as_str());
            continue;
        };
        for seat in record.seats().iter().filter(|s| !cancelled.contains(s)) {
            map.set(seat, status);
        }
    }

    for frozen in records.frozen_seats.iter().filter(|f| trip.matches(f.trip())) {
        for seat in frozen.seats().iter().filter(|s| !cancelled.contains(s)) {
            if map.set(seat, SeatStatus::Freezed).is_some_and(|prev| prev.is_booked()) {
                map.frozen_over_booked.insert(seat);
            }
        }
    }

    if !map.frozen_over_booked.is_empty() {
        warn!(
            "Frozen seats {:?} override existing bookings on bus {:?}/{:?} for {}",
            map.frozen_over_booked, trip.bus_id, trip.bus_no, trip.date
        );
    }

    map
}

/// Объединение мест всех отмен, относящихся к рейсу.
pub fn cancelled_seats(trip: &TripSelector, cancellations: &[Cancellation]) -> BTreeSet<u32> {
    cancellations
        .iter()
        .filter(|c| trip.matches(c.trip()))
        .flat_map(|c| c.seats().iter())
        .collect()
}

fn booking_seat_status(status: BookingStatus) -> Option<SeatStatus> {
    match status {
        BookingStatus::Confirmed => Some(SeatStatus::Reserved),
        BookingStatus::Processing => Some(SeatStatus::Processing),
        BookingStatus::Cancelled => Some(SeatStatus::Cancelled),
        BookingStatus::Freezed => Some(SeatStatus::Freezed),
        BookingStatus::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, FrozenSeat, GuestBooking, SeatSet, TripRef};
    use chrono::NaiveDate;

    const DATE: &str = "2025-06-15";

    fn selector() -> TripSelector {
        TripSelector::new(NaiveDate::parse_from_str(DATE, "%Y-%m-%d").unwrap())
            .with_bus_id("7")
            .with_bus_no("KA-01")
    }

    fn trip_ref() -> TripRef {
        TripRef {
            bus_id: Some("7".into()),
            bus_no: Some("KA-01".into()),
            departure_date: Some(DATE.into()),
        }
    }

    fn booking(status: BookingStatus, seats: &str) -> Booking {
        Booking {
            trip: trip_ref(),
            seat_no: SeatSet::parse(seats),
            status,
            ..Default::default()
        }
    }

    fn frozen(seats: &str) -> FrozenSeat {
        FrozenSeat {
            trip: trip_ref(),
            seat_no: SeatSet::parse(seats),
            ..Default::default()
        }
    }

    fn cancellation(seats: &str) -> Cancellation {
        Cancellation {
            trip: trip_ref(),
            seat_no: SeatSet::parse(seats),
            ..Default::default()
        }
    }

    fn statuses(map: &SeatStatusMap) -> Vec<SeatStatus> {
        map.iter().map(|(_, s)| *s).collect()
    }

    use crate::models::SeatStatus::{Available, Cancelled, Freezed, Processing, Reserved};

    #[test]
    fn empty_inputs_leave_everything_available() {
        let map = reconcile(5, &selector(), &TripRecords::default());
        assert_eq!(map.total_seats(), 5);
        assert_eq!(map.count(Available), 5);

        let map = reconcile(0, &selector(), &TripRecords::default());
        assert_eq!(map.total_seats(), 0);
    }

    #[test]
    fn booking_and_frozen_example() {
        let records = TripRecords {
            bookings: vec![booking(BookingStatus::Confirmed, "S1,S2")],
            frozen_seats: vec![frozen("S3")],
            ..Default::default()
        };
        let map = reconcile(4, &selector(), &records);
        assert_eq!(statuses(&map), vec![Reserved, Reserved, Freezed, Available]);
        assert!(map.frozen_over_booked.is_empty());
    }

    #[test]
    fn cancellation_wins_over_booking() {
        let records = TripRecords {
            bookings: vec![booking(BookingStatus::Confirmed, "S1,S2")],
            frozen_seats: vec![frozen("S3")],
            cancellations: vec![cancellation("S1")],
            ..Default::default()
        };
        let map = reconcile(4, &selector(), &records);
        assert_eq!(statuses(&map), vec![Available, Reserved, Freezed, Available]);
    }

    #[test]
    fn cancellation_wins_over_frozen() {
        let records = TripRecords {
            frozen_seats: vec![frozen("1,2")],
            cancellations: vec![cancellation("2")],
            ..Default::default()
        };
        let map = reconcile(2, &selector(), &records);
        assert_eq!(statuses(&map), vec![Freezed, Available]);
    }

    #[test]
    fn frozen_overrides_booked_seats_and_is_reported() {
        let records = TripRecords {
            bookings: vec![
                booking(BookingStatus::Confirmed, "1"),
                booking(BookingStatus::Processing, "2"),
            ],
            frozen_seats: vec![frozen("1,2,3")],
            ..Default::default()
        };
        let map = reconcile(3, &selector(), &records);
        assert_eq!(statuses(&map), vec![Freezed, Freezed, Freezed]);
        assert_eq!(map.frozen_over_booked.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn status_mapping_and_last_write_wins() {
        let records = TripRecords {
            bookings: vec![
                booking(BookingStatus::Confirmed, "1,2"),
                booking(BookingStatus::Processing, "2,3"),
                booking(BookingStatus::Cancelled, "4"),
                booking(BookingStatus::Unknown, "5"),
            ],
            guest_bookings: vec![GuestBooking {
                trip: trip_ref(),
                seat_no: SeatSet::parse("S3"),
                status: BookingStatus::Confirmed,
                ..Default::default()
            }],
            ..Default::default()
        };
        let map = reconcile(5, &selector(), &records);
        assert_eq!(statuses(&map), vec![Reserved, Processing, Reserved, Cancelled, Available]);
    }

    #[test]
    fn other_trips_and_out_of_range_seats_are_ignored() {
        let mut other_bus = booking(BookingStatus::Confirmed, "1");
        other_bus.trip = TripRef {
            bus_id: Some("8".into()),
            bus_no: Some("KA-02".into()),
            departure_date: Some(DATE.into()),
        };
        let mut other_day = frozen("2");
        other_day.trip.departure_date = Some("2025-06-16".into());
        let mut bad_date = booking(BookingStatus::Confirmed, "3");
        bad_date.trip.departure_date = Some("someday".into());
        let mut other_day_cancel = cancellation("4");
        other_day_cancel.trip.departure_date = Some("2025-06-14".into());

        let records = TripRecords {
            bookings: vec![
                other_bus,
                bad_date,
                booking(BookingStatus::Confirmed, "S4,S99,S0"),
            ],
            frozen_seats: vec![other_day],
            cancellations: vec![other_day_cancel],
            ..Default::default()
        };
        let map = reconcile(4, &selector(), &records);
        assert_eq!(statuses(&map), vec![Available, Available, Available, Reserved]);
        assert_eq!(map.total_seats(), 4);
    }

    #[test]
    fn matches_records_by_bus_number_only() {
        let mut by_number = booking(BookingStatus::Confirmed, "1");
        by_number.trip.bus_id = None;
        let records = TripRecords {
            bookings: vec![by_number],
            ..Default::default()
        };
        let map = reconcile(1, &selector(), &records);
        assert_eq!(map.get(1), Some(Reserved));
    }

    #[test]
    fn same_inputs_same_output() {
        let records = TripRecords {
            bookings: vec![booking(BookingStatus::Confirmed, "1,2")],
            frozen_seats: vec![frozen("2")],
            cancellations: vec![cancellation("3")],
            ..Default::default()
        };
        assert_eq!(reconcile(4, &selector(), &records), reconcile(4, &selector(), &records));
    }
}
