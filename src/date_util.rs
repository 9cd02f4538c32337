use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// Calendar-day bucket format used for timeline keys and wire dates.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// UTC calendar day of a timestamp as `YYYY-MM-DD`.
pub fn date_key(ts: &DateTime<Utc>) -> String {
    ts.format(DATE_KEY_FORMAT).to_string()
}

/// Fixed-width storage form of a timestamp. Lexical order matches
/// chronological order and the first ten characters are the date key.
/// Keeps full nanosecond precision so stored values compare exactly like
/// the `DateTime` they came from.
pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::InvalidTimestamp(s.to_string()))
}

/// Every calendar day from `start` through `end`, inclusive and ascending.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_key_uses_utc_day() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 59).unwrap();
        assert_eq!(date_key(&ts), "2024-01-05");
    }

    #[test]
    fn test_db_timestamp_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(to_db_timestamp(&a), "2024-01-05T09:00:00.000000000Z");
        assert_eq!(to_db_timestamp(&a).len(), to_db_timestamp(&b).len());
        assert!(to_db_timestamp(&a) < to_db_timestamp(&b));
        assert_eq!(&to_db_timestamp(&a)[..10], date_key(&a));
    }

    #[test]
    fn test_db_timestamp_keeps_sub_millisecond_order() {
        let base = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let a = base + chrono::Duration::microseconds(100);
        let b = base + chrono::Duration::microseconds(400);
        assert_eq!(to_db_timestamp(&a), "2024-01-10T12:00:00.000100000Z");
        assert!(to_db_timestamp(&a) < to_db_timestamp(&b));
        assert_eq!(parse_timestamp(&to_db_timestamp(&b)).unwrap(), b);
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-10").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-10T00:00:00Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-10T02:00:00+02:00").unwrap(),
            expected
        );
        assert_eq!(
            parse_timestamp(&to_db_timestamp(&expected)).unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2024-13-01").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_days_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let days: Vec<String> = days_inclusive(start, end)
            .map(|d| d.format(DATE_KEY_FORMAT).to_string())
            .collect();
        // Leap year
        assert_eq!(days, vec!["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"]);
    }

    #[test]
    fn test_days_inclusive_single_and_empty() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(days_inclusive(d, d).count(), 1);
        assert_eq!(days_inclusive(d, d.pred_opt().unwrap()).count(), 0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.0 / 7.0, 2), 0.14);
        assert_eq!(round_to(40.0, 1), 40.0);
        assert_eq!(round_to(2.0 / 3.0 * 100.0, 1), 66.7);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(0.0, 2), 0.0);
    }
}
