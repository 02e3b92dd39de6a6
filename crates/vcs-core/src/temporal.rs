//! # Temporal Types: UTC Timestamps
//!
//! Defines `Timestamp`, a UTC-only instant truncated to millisecond
//! precision. Credentials carry their validity window and proof creation
//! time as ISO-8601 strings in the form `YYYY-MM-DDTHH:MM:SS.mmmZ`, which is
//! what [`Timestamp::to_iso8601()`] renders.
//!
//! Input parsing is lenient: any RFC 3339 offset is accepted and converted
//! to UTC, seconds may be omitted, a date-time without an offset is read as
//! UTC, and a bare calendar date means midnight UTC. Output is always the
//! single normalized form, so a value parsed from one spelling and rendered
//! again is stable.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Date-time layouts without an offset, tried in order.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Input that is not an ISO-8601 date or date-time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid ISO-8601 timestamp: {input:?}")]
pub struct ParseTimestampError {
    /// The rejected input.
    pub input: String,
}

/// A UTC timestamp with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// From a `DateTime<Utc>`, truncating below milliseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_millis(dt))
    }

    /// Parse an ISO-8601 instant.
    ///
    /// Accepts:
    ///
    /// - RFC 3339 with any offset (`Z`, `+00:00`, `-04:00`)
    /// - minute precision with `Z` or an offset (`2025-01-01T00:00Z`)
    /// - a date-time with no offset, taken as UTC (`2024-01-01T00:00:00`,
    ///   `2024-01-01T00:00`)
    /// - a calendar date `YYYY-MM-DD`, taken as midnight UTC
    pub fn parse(s: &str) -> Result<Self, ParseTimestampError> {
        let trimmed = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_utc(dt.with_timezone(&Utc)));
        }
        if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M%:z") {
            return Ok(Self::from_utc(dt.with_timezone(&Utc)));
        }

        let naive = trimmed
            .strip_suffix(['Z', 'z'])
            .unwrap_or(trimmed);
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(|dt| Self::from_utc(dt.and_utc()))
            .ok_or_else(|| ParseTimestampError {
                input: s.to_string(),
            })
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    let millis = dt.nanosecond() / 1_000_000;
    dt.with_nanosecond(millis * 1_000_000).unwrap_or(dt)
}
