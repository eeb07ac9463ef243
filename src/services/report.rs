//! report.rs
//!
//! Сводка по рейсу для страниц отчётов: количество мест в каждом статусе,
//! число подтверждённых броней и выручка по ним.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{BookingStatus, SeatHolder, SeatSet, SeatStatus, TripRecords, TripSelector};

use super::reconciler::{cancelled_seats, reconcile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatReport {
    pub bus_id: Option<String>,
    pub bus_no: Option<String>,
    pub date: chrono::NaiveDate,
    pub total_seats: u32,
    pub seats_by_status: BTreeMap<SeatStatus, usize>,
    pub confirmed_bookings: usize,
    pub revenue: String,
    pub frozen_over_booked: BTreeSet<u32>,
}

/// Строит отчёт по тем же правилам, что и карту мест.
pub fn seat_report(total_seats: u32, trip: &TripSelector, records: &TripRecords) -> SeatReport {
    let map = reconcile(total_seats, trip, records);

    let seats_by_status = SeatStatus::ALL
        .into_iter()
        .map(|status| (status, map.count(status)))
        .collect();

    // Бронь выпадает из выручки, только когда отменены все её места
    let cancelled = cancelled_seats(trip, &records.cancellations);

    let confirmed = records
        .bookings
        .iter()
        .map(|b| (b as &dyn SeatHolder, b.price))
        .chain(records.guest_bookings.iter().map(|g| (g as &dyn SeatHolder, g.price)))
        .filter(|(record, _)| {
            record.status() == BookingStatus::Confirmed
                && trip.matches(record.trip())
                && !fully_cancelled(record.seats(), &cancelled)
        })
        .map(|(_, price)| price.unwrap_or(0.0))
        .collect::<Vec<_>>();

    let revenue: f64 = confirmed.iter().sum();

    tracing::info!(
        "Report for bus {:?} on {}: {} seats, {} confirmed bookings, revenue {:.2}",
        trip.bus_id, trip.date, total_seats, confirmed.len(), revenue
    );

    SeatReport {
        bus_id: trip.bus_id.clone(),
        bus_no: trip.bus_no.clone(),
        date: trip.date,
        total_seats,
        seats_by_status,
        confirmed_bookings: confirmed.len(),
        revenue: format!("{:.2}", revenue),
        frozen_over_booked: map.frozen_over_booked,
    }
}

fn fully_cancelled(seats: &SeatSet, cancelled: &BTreeSet<u32>) -> bool {
    !seats.is_empty() && seats.iter().all(|seat| cancelled.contains(&seat))
}
