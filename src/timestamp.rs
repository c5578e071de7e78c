// timestamp.rs

//! The eero API emits timestamps in a format that is not strictly RFC 3339,
//! such as "2024-01-02T15:04:05+0000". The `lenient` serde helper tries that
//! format first and falls back to RFC 3339.

use chrono::{DateTime, Utc};

pub(crate) fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Use with `#[serde(default, deserialize_with = "crate::timestamp::lenient")]`
/// on `Option<DateTime<Utc>>` fields.
pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let value = Option::<String>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => parse(&s).map(Some).map_err(serde::de::Error::custom),
    }
}
