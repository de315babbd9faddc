//! Timestamp and reporting-period utilities

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// First instant of the calendar month containing `instant` (UTC)
///
/// Used as the lower bound of the monthly quota period.
pub fn month_start(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(instant.year(), instant.month(), 1, 0, 0, 0)
        .single()
        .expect("first day of month is always a valid UTC timestamp")
}

/// ISO-8601 week label for an instant, e.g. "2026-W32"
///
/// Uses the ISO week-numbering year, which differs from the calendar year
/// around year boundaries (2027-01-01 falls in 2026-W53).
pub fn iso_week_label(instant: DateTime<Utc>) -> String {
    let week = instant.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_month_start_truncates_to_first_instant() {
        let instant = Utc.with_ymd_and_hms(2026, 8, 17, 14, 30, 45).unwrap();
        let start = month_start(instant);

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_start_is_idempotent() {
        let first = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(month_start(first), first);
    }

    #[test]
    fn test_month_start_excludes_previous_month() {
        let last_of_january = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let first_of_february = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        assert!(last_of_january < month_start(first_of_february + Duration::hours(5)));
    }

    #[test]
    fn test_iso_week_label_mid_year() {
        let instant = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        assert_eq!(iso_week_label(instant), "2026-W32");
    }

    #[test]
    fn test_iso_week_label_year_boundary() {
        // 2026-01-01 is a Thursday, so it belongs to ISO week 1 of 2026
        let new_year = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(iso_week_label(new_year), "2026-W01");

        // 2027-01-01 is a Friday in the last ISO week of 2026
        let next_new_year = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(iso_week_label(next_new_year), "2026-W53");
    }
}
