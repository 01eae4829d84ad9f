//! Lenient decoding of wire timestamps.
//!
//! The backend stamps payloads with local ISO-8601 times that carry no
//! offset (`2024-03-01T10:00:00.123456`). Those are read as UTC. Times
//! with an offset are converted to UTC. Encoding is unchanged (RFC 3339).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::Error, Deserialize, Deserializer};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an RFC 3339 time, or an offset-less ISO-8601 time taken as UTC.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, NAIVE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// Same as [`deserialize`], for optional fields. `null` reads as `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn naive_times_read_as_utc() {
        let at = parse("2024-03-01T10:00:00.123456").unwrap();
        assert_eq!(at.date_naive(), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap().date_naive());
        assert_eq!((at.hour(), at.minute(), at.second()), (10, 0, 0));
        assert_eq!(at.timestamp_subsec_micros(), 123_456);

        assert_eq!(
            parse("2024-03-01T10:00:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn offsets_are_converted() {
        assert_eq!(
            parse("2024-03-01T12:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(
            parse("2024-03-01T10:00:00Z"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse(""), None);
    }
}
