//! ISO-8601 timestamp codec.
//!
//! The backend and its clients exchange timestamps as ISO-8601 strings
//! with a `Z` suffix and millisecond precision (`2024-01-01T00:00:00.000Z`).
//! Values carrying sub-millisecond digits are written with micro- or
//! nanosecond precision so that decoding an encoded value is lossless.
//!
//! Use as a serde adapter:
//!
//! ```ignore
//! #[serde(with = "shared::iso8601")]
//! pub created_at: DateTime<Utc>,
//!
//! #[serde(default, with = "shared::iso8601::option", skip_serializing_if = "Option::is_none")]
//! pub last_login: Option<DateTime<Utc>>,
//! ```

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

/// Naive layout accepted when the sender omits the offset (treated as UTC).
const NAIVE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Formats a timestamp for the wire.
pub fn format(value: &DateTime<Utc>) -> String {
    let nanos = value.timestamp_subsec_nanos() % 1_000_000_000;
    let precision = if nanos % 1_000_000 == 0 {
        SecondsFormat::Millis
    } else if nanos % 1_000 == 0 {
        SecondsFormat::Micros
    } else {
        SecondsFormat::Nanos
    };
    value.to_rfc3339_opts(precision, true)
}

/// Parses a wire timestamp, normalizing any offset to UTC.
pub fn parse(input: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(input) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(input, NAIVE_LAYOUT)
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| de::Error::custom(format!("invalid ISO-8601 timestamp `{raw}`: {e}")))
}

/// Adapter for optional timestamps. Pair with `default` and
/// `skip_serializing_if = "Option::is_none"`.
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&super::format(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|r| {
            super::parse(&r)
                .map_err(|e| de::Error::custom(format!("invalid ISO-8601 timestamp `{r}`: {e}")))
        })
        .transpose()
    }
}
