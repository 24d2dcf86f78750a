//! Timestamp and date strings.
//!
//! Ledger files store instants as naive local times with microsecond
//! precision, e.g. `2024-01-01T09:00:00.000000`.

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::ParseError;

/// Format used for every persisted timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Accepts timestamps with or without the fractional part.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format of date-only filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of instants in report lines.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses a `YYYY-MM-DDTHH:MM:SS[.ffffff]` timestamp.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(input.trim(), TIMESTAMP_PARSE_FORMAT).map_err(|_| {
        ParseError::Timestamp {
            input: input.to_string(),
        }
    })
}

/// Parses a `YYYY-MM-DD` date as midnight of that day.
pub fn parse_date(input: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ParseError::Date {
            input: input.to_string(),
        })
}

/// Formats an instant in the persisted timestamp format.
pub fn format_timestamp(instant: NaiveDateTime) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Serde adapter for a required timestamp field.
pub(crate) mod required {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(*instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for an optional timestamp field.
pub(crate) mod optional {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(instant: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match instant {
            Some(instant) => serializer.serialize_some(&super::format_timestamp(*instant)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::parse_timestamp(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
