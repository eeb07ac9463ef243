use bus_ticketing::models::{
    Booking, BookingStatus, Cancellation, FrozenSeat, GuestBooking, SeatSet, SeatStatus, TripRecords, TripRef,
    TripSelector,
};
use bus_ticketing::services::reconciler::reconcile;
use chrono::NaiveDate;
use proptest::prelude::*;

const DATE: &str = "2025-06-15";

fn selector() -> TripSelector {
    TripSelector::new(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()).with_bus_id("7")
}

fn trip_ref() -> TripRef {
    TripRef {
        bus_id: Some("7".into()),
        bus_no: None,
        departure_date: Some(DATE.into()),
    }
}

fn seat_set(seats: &[u32]) -> SeatSet {
    seats.iter().copied().collect()
}

fn status_strategy() -> impl Strategy<Value = BookingStatus> {
    prop_oneof![
        Just(BookingStatus::Confirmed),
        Just(BookingStatus::Processing),
        Just(BookingStatus::Cancelled),
        Just(BookingStatus::Unknown),
    ]
}

// Номера мест иногда выходят за пределы автобуса
fn seats_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..50, 0..6)
}

prop_compose! {
    fn records_strategy()(
        bookings in prop::collection::vec((status_strategy(), seats_strategy()), 0..6),
        guests in prop::collection::vec((status_strategy(), seats_strategy()), 0..4),
        frozen in prop::collection::vec(seats_strategy(), 0..3),
        cancelled in prop::collection::vec(seats_strategy(), 0..3),
    ) -> TripRecords {
        TripRecords {
            bookings: bookings.into_iter().map(|(status, seats)| Booking {
                trip: trip_ref(),
                seat_no: seat_set(&seats),
                status,
                ..Default::default()
            }).collect(),
            guest_bookings: guests.into_iter().map(|(status, seats)| GuestBooking {
                trip: trip_ref(),
                seat_no: seat_set(&seats),
                status,
                ..Default::default()
            }).collect(),
            frozen_seats: frozen.into_iter().map(|seats| FrozenSeat {
                trip: trip_ref(),
                seat_no: seat_set(&seats),
                ..Default::default()
            }).collect(),
            cancellations: cancelled.into_iter().map(|seats| Cancellation {
                trip: trip_ref(),
                seat_no: seat_set(&seats),
                ..Default::default()
            }).collect(),
        }
    }
}

proptest! {
    #[test]
    fn empty_collections_give_all_available(total in 0u32..200) {
        let map = reconcile(total, &selector(), &TripRecords::default());
        prop_assert_eq!(map.total_seats(), total as usize);
        prop_assert_eq!(map.count(SeatStatus::Available), total as usize);
    }

    #[test]
    fn map_always_covers_every_seat(total in 0u32..40, records in records_strategy()) {
        let map = reconcile(total, &selector(), &records);
        prop_assert_eq!(map.total_seats(), total as usize);
        prop_assert!(map.iter().map(|(seat, _)| *seat).eq(1..=total));
    }

    #[test]
    fn cancelled_seats_are_never_taken(total in 0u32..40, records in records_strategy()) {
        let map = reconcile(total, &selector(), &records);
        for c in &records.cancellations {
            for seat in c.seat_no.iter() {
                if let Some(status) = map.get(seat) {
                    prop_assert!(
                        !matches!(status, SeatStatus::Reserved | SeatStatus::Processing | SeatStatus::Freezed),
                        "seat {} is {:?}", seat, status
                    );
                }
            }
        }
    }

    #[test]
    fn frozen_seats_are_freezed_unless_cancelled(total in 0u32..40, records in records_strategy()) {
        let map = reconcile(total, &selector(), &records);
        let cancelled: std::collections::BTreeSet<u32> =
            records.cancellations.iter().flat_map(|c| c.seat_no.iter()).collect();
        for f in &records.frozen_seats {
            for seat in f.seat_no.iter().filter(|s| !cancelled.contains(s)) {
                if seat <= total {
                    prop_assert_eq!(map.get(seat), Some(SeatStatus::Freezed));
                }
            }
        }
        for seat in &map.frozen_over_booked {
            prop_assert_eq!(map.get(*seat), Some(SeatStatus::Freezed));
        }
    }

    #[test]
    fn reconcile_is_idempotent(total in 0u32..40, records in records_strategy()) {
        prop_assert_eq!(reconcile(total, &selector(), &records), reconcile(total, &selector(), &records));
    }

    #[test]
    fn seat_formats_normalize_identically(seats in prop::collection::btree_set(1u32..500, 0..8)) {
        let csv = seats.iter().map(|s| format!("S{}", s)).collect::<Vec<_>>().join(",");
        let labels: Vec<String> = seats.iter().map(|s| format!("S{}", s)).collect();
        let numbers: Vec<u32> = seats.iter().copied().collect();

        let from_csv: SeatSet = serde_json::from_value(serde_json::json!(csv)).unwrap();
        let from_labels: SeatSet = serde_json::from_value(serde_json::json!(labels)).unwrap();
        let from_numbers: SeatSet = serde_json::from_value(serde_json::json!(numbers)).unwrap();

        prop_assert_eq!(&from_csv, &from_labels);
        prop_assert_eq!(&from_labels, &from_numbers);
        prop_assert_eq!(from_numbers.into_inner(), seats);
    }
}

#[test]
fn documented_examples_from_raw_json() {
    let records: TripRecords = serde_json::from_value(serde_json::json!({
        "bookings": [{"bus_id": 7, "departure_date": DATE, "status": "confirmed", "seat_no": "S1,S2"}],
        "guest_bookings": [],
        "frozen_seats": [{"bus_id": "7", "departureDate": DATE, "seat_no": ["S3"]}],
        "cancellations": []
    }))
    .unwrap();

    let map = reconcile(4, &selector(), &records);
    let expected = [
        SeatStatus::Reserved,
        SeatStatus::Reserved,
        SeatStatus::Freezed,
        SeatStatus::Available,
    ];
    assert!(map.iter().map(|(_, s)| *s).eq(expected));

    let mut with_cancel = records.clone();
    with_cancel.cancellations.push(Cancellation {
        trip: trip_ref(),
        seat_no: SeatSet::parse("S1"),
        ..Default::default()
    });
    let map = reconcile(4, &selector(), &with_cancel);
    let expected = [
        SeatStatus::Available,
        SeatStatus::Reserved,
        SeatStatus::Freezed,
        SeatStatus::Available,
    ];
    assert!(map.iter().map(|(_, s)| *s).eq(expected));
}
