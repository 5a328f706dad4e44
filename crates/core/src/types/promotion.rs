//! Discount and offer helpers.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::timestamp::parse_timestamp;

/// Whether a promotion is currently running.
///
/// A promotion is active when it has a non-empty value and either no expiry
/// or an expiry in the future. An expiry that cannot be parsed counts as
/// already passed.
#[must_use]
pub fn promotion_active(value: Option<&str>, expiry: Option<&str>, now: DateTime<Utc>) -> bool {
    if value.is_none_or(|v| v.trim().is_empty()) {
        return false;
    }

    match expiry.map(str::trim).filter(|e| !e.is_empty()) {
        None => true,
        Some(raw) => parse_timestamp(raw).is_some_and(|ts| ts > now),
    }
}

/// Read the leading decimal number of a value.
///
/// `"25"`, `"25.5% off"` and `" -10"` all yield a number; text without a
/// leading number yields `None`.
#[must_use]
pub fn leading_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in value.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }

    let number = value.get(..end)?.trim_end_matches('.');
    Decimal::from_str(number).ok().map(|d| d.normalize())
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
    fn test_leading_decimal_plain() {
        assert_eq!(leading_decimal("25"), Some(Decimal::from(25)));
        assert_eq!(leading_decimal("12.50"), Some(Decimal::new(125, 1)));
    }

    #[test]
    fn test_leading_decimal_with_suffix() {
        assert_eq!(leading_decimal("30% off"), Some(Decimal::from(30)));
        assert_eq!(leading_decimal("  7."), Some(Decimal::from(7)));
    }

    #[test]
    fn test_leading_decimal_text() {
        assert!(leading_decimal("Buy one get one").is_none());
        assert!(leading_decimal("").is_none());
        assert!(leading_decimal("-").is_none());
    }

    #[test]
    fn test_active_without_expiry() {
        assert!(promotion_active(Some("20"), None, now()));
        assert!(promotion_active(Some("20"), Some(""), now()));
    }

    #[test]
    fn test_active_respects_expiry() {
        assert!(promotion_active(Some("20"), Some("2026-03-11"), now()));
        assert!(!promotion_active(Some("20"), Some("2026-03-01"), now()));
    }

    #[test]
    fn test_unparseable_expiry_is_inactive() {
        assert!(!promotion_active(Some("20"), Some("soon"), now()));
    }

    #[test]
    fn test_missing_value_is_inactive() {
        assert!(!promotion_active(None, None, now()));
        assert!(!promotion_active(Some("  "), None, now()));
    }
}
