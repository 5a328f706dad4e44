//! Release, update, and expiry timestamps.
//!
//! Catalog sources write dates either as RFC 3339 timestamps or as plain
//! `YYYY-MM-DD` dates. Plain dates and offset-less date-times are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// Number of days during which a release or update counts as recent.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Parse a catalog timestamp.
///
/// Returns `None` for empty or unrecognised input.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Whether a timestamp lies within the recent window before `now`.
///
/// Future timestamps count as recent.
#[must_use]
pub fn is_recent(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    timestamp.is_some_and(|ts| now.signed_duration_since(ts) < TimeDelta::days(RECENT_WINDOW_DAYS))
}

/// Countdown label for an expiry, e.g. `"⏳ 2d 3h 15m left"`.
///
/// Returns `None` once the expiry has passed.
#[must_use]
pub fn time_left(expiry: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let remaining = expiry.signed_duration_since(now);
    if remaining <= TimeDelta::zero() {
        return None;
    }

    let minutes = remaining.num_minutes();
    let days = minutes / 1440;
    let hours = (minutes % 1440) / 60;
    let mins = minutes % 60;

    let mut label = String::from("⏳ ");
    if days > 0 {
        label.push_str(&format!("{days}d "));
    }
    if hours > 0 {
        label.push_str(&format!("{hours}h "));
    }
    label.push_str(&format!("{mins}m left"));
    Some(label)
}

/// Whole days until an expiry, rounded up and never negative.
#[must_use]
pub fn days_left(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = expiry.signed_duration_since(now);
    if remaining <= TimeDelta::zero() {
        return 0;
    }
    let day_ms = TimeDelta::days(1).num_milliseconds();
    (remaining.num_milliseconds() + day_ms - 1) / day_ms
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        let ts = parse_timestamp("2026-03-01").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse_timestamp("2026-03-01T10:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime() {
        let ts = parse_timestamp("2026-03-01T10:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn test_is_recent_window() {
        let six_days = now() - TimeDelta::days(6);
        let eight_days = now() - TimeDelta::days(8);
        assert!(is_recent(Some(six_days), now()));
        assert!(!is_recent(Some(eight_days), now()));
        assert!(!is_recent(None, now()));
    }

    #[test]
    fn test_time_left_format() {
        let expiry = now() + TimeDelta::days(2) + TimeDelta::hours(3) + TimeDelta::minutes(15);
        assert_eq!(time_left(expiry, now()).unwrap(), "⏳ 2d 3h 15m left");

        let soon = now() + TimeDelta::minutes(5);
        assert_eq!(time_left(soon, now()).unwrap(), "⏳ 5m left");
    }

    #[test]
    fn test_time_left_expired() {
        assert!(time_left(now(), now()).is_none());
        assert!(time_left(now() - TimeDelta::hours(1), now()).is_none());
    }

    #[test]
    fn test_days_left_rounds_up() {
        assert_eq!(days_left(now() + TimeDelta::hours(1), now()), 1);
        assert_eq!(days_left(now() + TimeDelta::days(3), now()), 3);
        assert_eq!(days_left(now() - TimeDelta::days(3), now()), 0);
    }
}
