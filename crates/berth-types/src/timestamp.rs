//! `YYYY-MM-DD HH:MM:SS` timestamps.
//!
//! Entities carry `NaiveDateTime`; text only exists at the storage and
//! transport boundaries, and always in this layout.

use chrono::{NaiveDateTime, ParseError, Timelike};

/// Canonical layout used for storage and JSON.
pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Like FORMAT, but a trailing fraction is accepted (and dropped).
const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse a timestamp, tolerating the ISO-8601 `2023-10-01T12:00:00Z` spelling.
///
/// `T` becomes a space and `Z` is removed before parsing. Sub-second
/// precision is truncated so the value round-trips through [`format`].
pub fn parse(input: &str) -> Result<NaiveDateTime, ParseError> {
    let normalized = input.replace('T', " ").replace('Z', "");
    let ts = NaiveDateTime::parse_from_str(&normalized, PARSE_FORMAT)?;
    Ok(ts.with_nanosecond(0).unwrap_or(ts))
}

pub fn format(ts: &NaiveDateTime) -> String {
    ts.format(FORMAT).to_string()
}

/// Serde adapter: `#[serde(with = "berth_types::timestamp::serde_format")]`.
pub mod serde_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw).map_err(D::Error::custom)
    }
}
