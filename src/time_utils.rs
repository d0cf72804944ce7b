// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! Task due dates are plain `YYYY-MM-DD` strings; event timestamps are
//! RFC3339 UTC.

use crate::models::RepeatUnit;
use chrono::{DateTime, Days, Months, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a `YYYY-MM-DD` due date.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Format a date back to `YYYY-MM-DD`.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Advance a date by one recurrence step.
pub fn advance_by(date: NaiveDate, interval: u32, unit: RepeatUnit) -> NaiveDate {
    match unit {
        RepeatUnit::Days => date
            .checked_add_days(Days::new(interval as u64))
            .unwrap_or(date),
        RepeatUnit::Weeks => date
            .checked_add_days(Days::new(interval as u64 * 7))
            .unwrap_or(date),
        RepeatUnit::Months => date.checked_add_months(Months::new(interval)).unwrap_or(date),
    }
}

/// Catch a recurring due date up to `today`.
///
/// Steps the due date forward by the recurrence interval until it is no
/// longer in the past, stopping early if the next candidate would pass
/// `end_date`. Returns `None` when the date did not move.
pub fn catch_up_due_date(
    due: NaiveDate,
    today: NaiveDate,
    interval: u32,
    unit: RepeatUnit,
    end_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    // Zero interval would loop forever.
    if interval == 0 {
        return None;
    }

    let mut next = due;
    while next < today {
        let candidate = advance_by(next, interval, unit);
        if candidate == next {
            return None; // date arithmetic saturated
        }
        if let Some(end) = end_date {
            if candidate > end {
                break;
            }
        }
        next = candidate;
    }

    (next != due).then_some(next)
}
