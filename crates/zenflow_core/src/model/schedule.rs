//! Date/time cell normalization.
//!
//! The spreadsheet backend hands date and time cells back as ISO-8601
//! timestamps (`1899-12-30T11:00:00.000Z` for a bare time). Local values are
//! stored as `YYYY-MM-DD` and `HH:MM`. Dates keep the calendar prefix as
//! written, times are read in the local zone, and anything unrecognized is
//! left untouched.

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

static CLOCK_WITH_SECONDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}:\d{2}):\d{2}$").expect("valid clock regex"));
static ISO_CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"T(\d{2}:\d{2})").expect("valid iso clock regex"));

/// Returns the `YYYY-MM-DD` form of a date cell.
///
/// The part before `T` is kept verbatim; a zone offset never moves the day.
pub fn normalize_date(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.split_once('T') {
        Some((day, _)) => day.to_string(),
        None => trimmed.to_string(),
    }
}

/// Returns the `HH:MM` form of a time cell.
pub fn normalize_time(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.contains('T') {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return parsed.with_timezone(&Local).format("%H:%M").to_string();
        }
        if let Some(caps) = ISO_CLOCK_RE.captures(trimmed) {
            return caps[1].to_string();
        }
        return trimmed.to_string();
    }
    if let Some(caps) = CLOCK_WITH_SECONDS_RE.captures(trimmed) {
        return caps[1].to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::{normalize_date, normalize_time};
    use chrono::{DateTime, Local};

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(normalize_date("2026-10-18"), "2026-10-18");
        assert_eq!(normalize_time("07:30"), "07:30");
        assert_eq!(normalize_time("evening"), "evening");
    }

    #[test]
    fn seconds_are_dropped() {
        assert_eq!(normalize_time("19:00:00"), "19:00");
    }

    #[test]
    fn naive_iso_values_use_their_wall_clock() {
        assert_eq!(normalize_date("2026-10-18T00:00:00"), "2026-10-18");
        assert_eq!(normalize_time("1899-12-30T19:15:00"), "19:15");
    }

    #[test]
    fn zoned_iso_dates_keep_their_calendar_day() {
        assert_eq!(normalize_date("2026-05-31T16:00:00.000Z"), "2026-05-31");
        assert_eq!(normalize_date(" 2026-05-31T23:30:00+02:00 "), "2026-05-31");
    }

    #[test]
    fn zoned_iso_times_are_shifted_to_local_time() {
        let raw = "2026-05-31T16:00:00.000Z";
        let local = DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(normalize_time(raw), local.format("%H:%M").to_string());
    }
}
