//! Timestamp and timezone helpers shared by the engines.
//!
//! Every timestamp in a schedule is an RFC 3339 instant with an explicit UTC
//! offset. Timestamps are kept at millisecond resolution: sub-millisecond
//! digits are truncated on parse, and rescaling works in whole milliseconds.

use chrono::{DateTime, FixedOffset, SecondsFormat, SubsecRound};
use chrono_tz::Tz;

use crate::error::ScheduleError;

/// Number of fractional-second digits kept on every timestamp.
pub const SUBSEC_DIGITS: u16 = 3;

/// Parse an RFC 3339 timestamp, truncating it to millisecond resolution.
///
/// Offset-less timestamps (e.g. `"2026-03-15T10:00:00"`) are rejected.
///
/// # Examples
///
/// ```
/// use wcif_schedule::{format_timestamp, parse_timestamp};
///
/// let dt = parse_timestamp("2026-03-15T10:00:00.123456-05:00").unwrap();
/// assert_eq!(format_timestamp(&dt), "2026-03-15T10:00:00.123-05:00");
/// assert!(parse_timestamp("2026-03-15T10:00:00").is_err());
/// ```
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, ScheduleError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.trunc_subsecs(SUBSEC_DIGITS))
        .map_err(|e| ScheduleError::InvalidDatetime(format!("'{}': {}", s, e)))
}

/// Format a timestamp the way it travels on the wire.
///
/// UTC instants are written with a `Z` suffix, and fractional seconds only
/// appear when they are non-zero.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an IANA timezone name into `Tz`. The empty name is not a timezone.
pub fn parse_timezone(s: &str) -> Result<Tz, ScheduleError> {
    s.parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimezone(format!("'{}'", s)))
}

/// Whole milliseconds from `from` to `to` (negative if `to` is earlier).
pub fn millis_between(from: &DateTime<FixedOffset>, to: &DateTime<FixedOffset>) -> i64 {
    (*to - *from).num_milliseconds()
}

/// Serde adapter for `DateTime<FixedOffset>` fields using [`parse_timestamp`]
/// and [`format_timestamp`].
pub mod rfc3339 {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_keeps_offset() {
        let dt = parse_timestamp("2026-03-15T10:00:00+09:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_truncates_to_millis() {
        let dt = parse_timestamp("2026-03-15T10:00:00.123456789Z").unwrap();
        assert_eq!(dt.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_parse_rejects_naive_timestamp() {
        let err = parse_timestamp("2026-03-15T10:00:00").unwrap_err().to_string();
        assert!(err.contains("Invalid datetime"), "got: {err}");
    }

    #[test]
    fn test_format_uses_z_for_utc() {
        let dt = parse_timestamp("2026-03-15T10:00:00+00:00").unwrap();
        assert_eq!(format_timestamp(&dt), "2026-03-15T10:00:00Z");
    }

    #[test]
    fn test_format_keeps_offset_and_millis() {
        let dt = parse_timestamp("2026-03-15T10:00:00.250-05:00").unwrap();
        assert_eq!(format_timestamp(&dt), "2026-03-15T10:00:00.250-05:00");
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Europe/Paris").is_ok());
        assert!(parse_timezone("").is_err());
        let err = parse_timezone("Invalid/Zone").unwrap_err().to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_millis_between_across_offsets() {
        let a = parse_timestamp("2026-03-15T10:00:00Z").unwrap();
        let b = parse_timestamp("2026-03-15T12:30:00+02:00").unwrap();
        assert_eq!(millis_between(&a, &b), 30 * 60 * 1000);
        assert_eq!(millis_between(&b, &a), -30 * 60 * 1000);
    }
}
