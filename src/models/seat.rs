//! seat.rs
//!
//! Номера мест и их отображаемые статусы.
//!
//! Бэкенд присылает номера мест в любом виде: `"S1,S2"`, `["S1","S2"]`, `[1,2]`,
//! одиночное число или `null`. `SeatSet` приводит всё это к множеству
//! положительных целых прямо при десериализации, дальше код работает только
//! со строгим типом.

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;

/// Нормализованный набор номеров мест одной записи.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeatSet(BTreeSet<u32>);

impl SeatSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Разбирает строку вида `"S1, S2,3"`. Непонятные токены отбрасываются.
    pub fn parse(raw: &str) -> Self {
        let mut set = Self::new();
        set.extend_from_str(raw);
        set
    }

    pub fn contains(&self, seat: u32) -> bool {
        self.0.contains(&seat)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn into_inner(self) -> BTreeSet<u32> {
        self.0
    }

    fn extend_from_str(&mut self, raw: &str) {
        for token in raw.split(',') {
            match parse_token(token) {
                Some(seat) => {
                    self.0.insert(seat);
                }
                None if token.trim().is_empty() => {}
                None => tracing::debug!("Dropping unparseable seat token {:?}", token),
            }
        }
    }

    fn insert_number(&mut self, value: u64) {
        match u32::try_from(value) {
            Ok(seat) if seat > 0 => {
                self.0.insert(seat);
            }
            _ => tracing::debug!("Dropping out-of-range seat number {}", value),
        }
    }
}

impl FromIterator<u32> for SeatSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|seat| *seat > 0).collect())
    }
}

// Все нецифровые символы (включая префикс `S`) выкидываются
fn parse_token(token: &str) -> Option<u32> {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u32>().ok().filter(|seat| *seat > 0)
}

impl<'de> Deserialize<'de> for SeatSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SeatSetVisitor)
    }
}

/// Никогда не падает: всё, что не похоже на номера мест, даёт пустой набор.
struct SeatSetVisitor;

impl<'de> Visitor<'de> for SeatSetVisitor {
    type Value = SeatSet;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("seat numbers as a string, number or array")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SeatSet, E> {
        Ok(SeatSet::parse(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SeatSet, E> {
        let mut set = SeatSet::new();
        set.insert_number(v);
        Ok(set)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SeatSet, E> {
        let mut set = SeatSet::new();
        match u64::try_from(v) {
            Ok(v) => set.insert_number(v),
            Err(_) => tracing::debug!("Dropping negative seat number {}", v),
        }
        Ok(set)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<SeatSet, E> {
        let mut set = SeatSet::new();
        if v.is_finite() && v.fract() == 0.0 && v >= 1.0 && v <= f64::from(u32::MAX) {
            set.insert_number(v as u64);
        } else {
            tracing::debug!("Dropping non-integer seat number {}", v);
        }
        Ok(set)
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<SeatSet, E> {
        Ok(SeatSet::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<SeatSet, E> {
        Ok(SeatSet::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<SeatSet, E> {
        Ok(SeatSet::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<SeatSet, D::Error> {
        deserializer.deserialize_any(SeatSetVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SeatSet, A::Error> {
        // Элементы могут быть строками, числами или вложенными массивами
        let mut set = SeatSet::new();
        while let Some(part) = seq.next_element::<SeatSet>()? {
            set.0.extend(part.0);
        }
        Ok(set)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SeatSet, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        tracing::debug!("Seat field is an object, treating as empty");
        Ok(SeatSet::new())
    }
}

/// Отображаемый статус места для конкретного автобуса и даты.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Processing,
    Reserved,
    Freezed,
    Cancelled,
}

impl SeatStatus {
    pub const ALL: [SeatStatus; 5] = [
        SeatStatus::Available,
        SeatStatus::Processing,
        SeatStatus::Reserved,
        SeatStatus::Freezed,
        SeatStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Processing => "processing",
            SeatStatus::Reserved => "reserved",
            SeatStatus::Freezed => "freezed",
            SeatStatus::Cancelled => "cancelled",
        }
    }

    /// Место занято пассажиром (оплачено или удерживается на время оплаты).
    pub fn is_booked(&self) -> bool {
        matches!(self, SeatStatus::Reserved | SeatStatus::Processing)
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Карта статусов мест `1..=total_seats`. Пересчитывается на каждый запрос и
/// нигде не хранится.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatStatusMap {
    pub seats: BTreeMap<u32, SeatStatus>,
    /// Места, где заморозка перезаписала reserved/processing.
    pub frozen_over_booked: BTreeSet<u32>,
}

impl SeatStatusMap {
    pub fn all_available(total_seats: u32) -> Self {
        Self {
            seats: (1..=total_seats).map(|seat| (seat, SeatStatus::Available)).collect(),
            frozen_over_booked: BTreeSet::new(),
        }
    }

    pub fn total_seats(&self) -> usize {
        self.seats.len()
    }

    pub fn get(&self, seat: u32) -> Option<SeatStatus> {
        self.seats.get(&seat).copied()
    }

    /// Меняет статус только для существующего места, возвращает прежний.
    pub(crate) fn set(&mut self, seat: u32, status: SeatStatus) -> Option<SeatStatus> {
        self.seats
            .get_mut(&seat)
            .map(|slot| std::mem::replace(slot, status))
    }

    pub fn count(&self, status: SeatStatus) -> usize {
        self.seats.values().filter(|s| **s == status).count()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, u32, SeatStatus> {
        self.seats.iter()
    }
}
