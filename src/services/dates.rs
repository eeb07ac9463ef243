//! Выбор даты по умолчанию при выборе автобуса.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};

use crate::models::trip::parse_day;

/// Разбирает даты расписания; нераспознанные строки логируются и отбрасываются.
pub fn parse_dates<S: AsRef<str>>(dates: &[S]) -> BTreeSet<NaiveDate> {
    dates
        .iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            let day = parse_day(raw);
            if day.is_none() {
                tracing::debug!("Skipping unparseable schedule date {:?}", raw);
            }
            day
        })
        .collect()
}

/// Сегодня, иначе ближайшая будущая дата, иначе последняя прошедшая.
pub fn default_date<S: AsRef<str>>(dates: &[S], today: NaiveDate) -> Option<NaiveDate> {
    pick_default(&parse_dates(dates), today)
}

/// Дата по умолчанию первой, за ней все остальные по возрастанию.
pub fn prioritize_dates<S: AsRef<str>>(dates: &[S], today: NaiveDate) -> Vec<NaiveDate> {
    let parsed = parse_dates(dates);
    let Some(first) = pick_default(&parsed, today) else {
        return Vec::new();
    };
    std::iter::once(first)
        .chain(parsed.into_iter().filter(|d| *d != first))
        .collect()
}

fn pick_default(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    if dates.contains(&today) {
        return Some(today);
    }
    dates
        .range((Excluded(today), Unbounded))
        .next()
        .or_else(|| dates.range(..today).next_back())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn nearest_future_date_wins() {
        let dates = ["2025-01-01", "2025-06-15"];
        assert_eq!(default_date(&dates, d("2025-06-10")), Some(d("2025-06-15")));
    }

    #[test]
    fn today_wins_over_everything() {
        let dates = ["2025-06-11", "2025-06-10T09:00:00Z", "2025-06-01"];
        assert_eq!(default_date(&dates, d("2025-06-10")), Some(d("2025-06-10")));
    }

    #[test]
    fn falls_back_to_most_recent_past() {
        let dates = ["2025-01-01", "2025-03-01", "2024-12-31"];
        assert_eq!(default_date(&dates, d("2025-06-10")), Some(d("2025-03-01")));
    }

    #[test]
    fn nothing_usable() {
        let empty: [&str; 0] = [];
        assert_eq!(default_date(&empty, d("2025-06-10")), None);
        assert_eq!(default_date(&["tomorrow", ""], d("2025-06-10")), None);
        assert!(prioritize_dates(&["bad"], d("2025-06-10")).is_empty());
    }

    #[test]
    fn ordering_puts_default_first_then_ascending() {
        let dates = vec![
            "2025-07-01".to_string(),
            "2025-01-01".to_string(),
            "2025-06-15".to_string(),
            "2025-06-15".to_string(),
            "garbage".to_string(),
        ];
        assert_eq!(
            prioritize_dates(&dates, d("2025-06-10")),
            vec![d("2025-06-15"), d("2025-01-01"), d("2025-07-01")]
        );
    }
}
