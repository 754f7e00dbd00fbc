use chrono::{Datelike, Duration, NaiveDate};

/// First Monday covered by the board. All week keys are derived from this
/// date, so it must never change once schedules have been persisted.
pub fn epoch_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 13).expect("valid epoch date")
}

/// Start date of the week at `index` (epoch + 7 * index days)
pub fn week_start_date(index: u32) -> NaiveDate {
    epoch_monday() + Duration::days(7 * i64::from(index))
}

/// Map key for the week at `index`, e.g. `week_2025-01-13`
pub fn week_key(index: u32) -> String {
    week_key_for_date(week_start_date(index))
}

/// Map key for a week starting on the given Monday.
/// Date arithmetic is calendar-only (NaiveDate), so the key never shifts
/// with the host timezone or DST.
pub fn week_key_for_date(monday: NaiveDate) -> String {
    format!("week_{}", monday.format("%Y-%m-%d"))
}

/// The upcoming Monday as seen from `today`. On a Monday this returns
/// `today` itself, matching how the board counts its weeks.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days_ahead = (8 - today.weekday().num_days_from_sunday()) % 7;
    today + Duration::days(i64::from(days_ahead))
}

/// Formats a week start for display, e.g. "13 Jan"
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%-d %b").to_string()
}

/// Formats a week start for email subjects, e.g. "13 January 2025"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}
