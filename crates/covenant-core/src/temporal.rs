//! # Temporal Types
//!
//! UTC-only timestamp type for the attestation pipeline. Attestations are
//! timestamped in UTC at second-level precision. Two representations matter:
//! the ISO 8601 form used in HTTP responses (`created_at`), and the
//! unix-seconds integer form that goes into the signed canonical payload's
//! `ts` field — an integer, not a string, so it needs no datetime-string
//! normalization in the canonicalizer.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A UTC timestamp with second-level precision.
///
/// Serializes to ISO 8601 format with `Z` suffix (e.g., `2026-01-15T12:00:00Z`).
/// Subsecond precision is truncated so that deriving a canonical payload from
/// the same instant always produces the same `ts` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncated to seconds.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Create a timestamp from a unix-seconds integer.
    pub fn from_unix_seconds(secs: i64) -> Self {
        Self(Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now))
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The unix-seconds integer form used in the signed canonical payload's `ts` field.
    pub fn as_unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Return the timestamp as an ISO 8601 string with `Z` suffix, truncated to seconds.
    pub fn to_canonical_string(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_seconds_roundtrip() {
        let ts = Timestamp::from_unix_seconds(1_700_000_000);
        assert_eq!(ts.as_unix_seconds(), 1_700_000_000);
    }

    #[test]
    fn canonical_string_has_z_suffix_and_no_subseconds() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(123);
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(ts.to_canonical_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn truncates_subsecond_precision() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap() + chrono::Duration::nanoseconds(999);
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn display_matches_canonical_string() {
        let ts = Timestamp::from_unix_seconds(0);
        assert_eq!(format!("{ts}"), ts.to_canonical_string());
    }
}
