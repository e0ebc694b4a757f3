use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use thiserror::Error;

pub const DEFAULT_TIMEZONE: &str = "America/New_York";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const WIRE_NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("timestamp cannot be empty")]
    Empty,
    #[error("invalid datetime format: expected YYYY-MM-DD HH:MM or RFC 3339")]
    InvalidDateTime,
    #[error("invalid date format: expected YYYY-MM-DD")]
    InvalidDateFormat,
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("local time does not exist: {0}")]
    NonexistentLocalTime(String),
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn parse_timezone(name: &str) -> Result<Tz, TimeParseError> {
    let trimmed = name.trim();
    trimmed
        .parse::<Tz>()
        .map_err(|_| TimeParseError::InvalidTimezone(trimmed.to_string()))
}

pub fn is_valid_timezone(name: &str) -> bool {
    parse_timezone(name).is_ok()
}

/// Parses user input into an instant. Wall-clock input is interpreted in `tz`;
/// RFC 3339 input carries its own offset.
pub fn parse_instant(input: &str, tz: Tz) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return local_to_utc(naive, tz);
        }
    }

    Err(TimeParseError::InvalidDateTime)
}

pub fn parse_date(input: &str) -> Result<NaiveDate, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| TimeParseError::InvalidDateFormat)
}

pub fn format_local(ts: DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}

/// Renders `ts` as wall time in `tz` that [`parse_instant`] reads back to the
/// same instant. Seconds and fractions appear only when non-zero; the second
/// reading of a DST fold keeps its offset.
pub fn format_editable(ts: DateTime<Utc>, tz: Tz) -> String {
    let local = ts.with_timezone(&tz);
    if let LocalResult::Ambiguous(earliest, _) = tz.from_local_datetime(&local.naive_local()) {
        if earliest != local {
            return local.to_rfc3339_opts(SecondsFormat::AutoSi, false);
        }
    }
    let fmt = if local.nanosecond() != 0 {
        "%Y-%m-%d %H:%M:%S%.f"
    } else if local.second() != 0 {
        "%Y-%m-%d %H:%M:%S"
    } else {
        "%Y-%m-%d %H:%M"
    };
    local.format(fmt).to_string()
}

/// Formats `ts` in the named zone, falling back to UTC for unknown names.
pub fn format_in_timezone(ts: DateTime<Utc>, timezone: &str) -> String {
    let tz = parse_timezone(timezone).unwrap_or(Tz::UTC);
    format_local(ts, tz)
}

pub fn format_wire(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Server timestamps are RFC 3339; offset-less values are taken as UTC.
pub fn parse_wire_instant(raw: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in WIRE_NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(TimeParseError::InvalidDateTime)
}

fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, TimeParseError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        // DST fold: the earlier of the two readings wins.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(TimeParseError::NonexistentLocalTime(naive.to_string())),
    }
}

pub mod wire_instant {
    use super::{format_wire, parse_wire_instant};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_wire(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wire_instant(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use super::super::{format_wire, parse_wire_instant};
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(ts) => serializer.serialize_some(&format_wire(*ts)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw {
                Some(value) if !value.trim().is_empty() => {
                    parse_wire_instant(&value).map(Some).map_err(de::Error::custom)
                }
                _ => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_editable, format_in_timezone, parse_date, parse_instant, parse_timezone,
        parse_wire_instant, TimeParseError,
    };
    use chrono::{TimeZone, Utc};
    use chrono_tz::Tz;

    #[test]
    fn parse_instant_uses_the_given_zone() {
        let tz = parse_timezone("America/New_York").unwrap();
        let ts = parse_instant("2023-09-15T14:00", tz).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 9, 15, 18, 0, 0).unwrap());
    }

    #[test]
    fn parse_instant_accepts_space_separated_and_seconds() {
        let ts = parse_instant("2023-09-15 14:00:30", Tz::UTC).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 9, 15, 14, 0, 30).unwrap());
    }

    #[test]
    fn parse_instant_prefers_explicit_offset() {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        let ts = parse_instant("2023-09-15T14:00:00+02:00", tz).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 9, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn parse_instant_rejects_empty_and_garbage() {
        assert_eq!(parse_instant("  ", Tz::UTC).unwrap_err(), TimeParseError::Empty);
        assert_eq!(
            parse_instant("next tuesday", Tz::UTC).unwrap_err(),
            TimeParseError::InvalidDateTime
        );
    }

    #[test]
    fn parse_instant_rejects_spring_forward_gap() {
        let tz = parse_timezone("America/New_York").unwrap();
        let err = parse_instant("2024-03-10 02:30", tz).unwrap_err();
        assert!(matches!(err, TimeParseError::NonexistentLocalTime(_)));
    }

    #[test]
    fn parse_instant_takes_earliest_in_fall_back_fold() {
        let tz = parse_timezone("America/New_York").unwrap();
        let ts = parse_instant("2024-11-03 01:30", tz).unwrap();
        // 01:30 EDT (UTC-4) comes before 01:30 EST (UTC-5).
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
    }

    #[test]
    fn parse_timezone_rejects_unknown_names() {
        assert_eq!(
            parse_timezone("Mars/Olympus").unwrap_err(),
            TimeParseError::InvalidTimezone("Mars/Olympus".to_string())
        );
    }

    #[test]
    fn parse_date_requires_iso_format() {
        assert!(parse_date("2024-01-31").is_ok());
        assert_eq!(
            parse_date("31/01/2024").unwrap_err(),
            TimeParseError::InvalidDateFormat
        );
    }

    #[test]
    fn wire_instant_accepts_naive_and_fractional() {
        let ts = parse_wire_instant("2023-09-15T14:00:00.250").unwrap();
        assert_eq!(ts.timestamp(), Utc.with_ymd_and_hms(2023, 9, 15, 14, 0, 0).unwrap().timestamp());
    }

    #[test]
    fn format_editable_keeps_seconds_only_when_present() {
        let tz = parse_timezone("America/New_York").unwrap();
        let whole = Utc.with_ymd_and_hms(2023, 9, 15, 18, 0, 0).unwrap();
        let seconds = Utc.with_ymd_and_hms(2023, 9, 15, 18, 0, 30).unwrap();
        let fraction = seconds + chrono::Duration::milliseconds(250);

        assert_eq!(format_editable(whole, tz), "2023-09-15 14:00");
        assert_eq!(format_editable(seconds, tz), "2023-09-15 14:00:30");
        assert_eq!(format_editable(fraction, tz), "2023-09-15 14:00:30.250");
        for ts in [whole, seconds, fraction] {
            assert_eq!(parse_instant(&format_editable(ts, tz), tz).unwrap(), ts);
        }
    }

    #[test]
    fn format_editable_keeps_later_fold_reading() {
        let tz = parse_timezone("America/New_York").unwrap();
        // 01:30 EST, the second 01:30 of the night.
        let later = Utc.with_ymd_and_hms(2024, 11, 3, 6, 30, 0).unwrap();
        let text = format_editable(later, tz);
        assert_eq!(text, "2024-11-03T01:30:00-05:00");
        assert_eq!(parse_instant(&text, tz).unwrap(), later);
    }

    #[test]
    fn format_in_timezone_falls_back_to_utc() {
        let ts = Utc.with_ymd_and_hms(2023, 9, 15, 18, 0, 0).unwrap();
        assert_eq!(format_in_timezone(ts, "America/New_York"), "2023-09-15 14:00");
        assert_eq!(format_in_timezone(ts, "nowhere"), "2023-09-15 18:00");
    }
}
