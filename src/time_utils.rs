// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Layout of Strava's `start_date`: always UTC, always a literal `Z`.
const STRAVA_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse Strava's `start_date` (no offset, assumed UTC).
pub fn parse_strava_utc(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, STRAVA_UTC_FORMAT).map(|naive| naive.and_utc())
}

/// Parse Strava's `start_date_local`, which carries its own offset.
pub fn parse_strava_local(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_strava_utc() {
        let parsed = parse_strava_utc("2024-03-09T17:05:42Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 42).unwrap());
    }

    #[test]
    fn test_parse_strava_utc_rejects_offset() {
        assert!(parse_strava_utc("2024-03-09T17:05:42+01:00").is_err());
        assert!(parse_strava_utc("2024-03-09").is_err());
    }

    #[test]
    fn test_parse_strava_local_honors_offset() {
        let zulu = parse_strava_local("2024-03-09T09:05:42Z").unwrap();
        assert_eq!(zulu, Utc.with_ymd_and_hms(2024, 3, 9, 9, 5, 42).unwrap());

        let pacific = parse_strava_local("2024-03-09T09:05:42-08:00").unwrap();
        assert_eq!(pacific, Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 42).unwrap());
    }

    #[test]
    fn test_format_utc_rfc3339() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 42).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2024-03-09T17:05:42Z");
    }
}
