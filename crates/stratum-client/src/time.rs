//! Textual time expressions.
//!
//! Temporal arguments accept either an absolute numeric instant or a human
//! phrase. A numeric literal passes through untouched; everything else is
//! anchored to the current clock or parsed as a calendar date.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use stratum_types::Timestamp;

use crate::error::{DriverError, DriverResult};

/// Parses a time expression into an absolute instant.
pub fn parse_phrase(text: &str) -> DriverResult<Timestamp> {
    parse_at(text, Utc::now())
}

/// Parses `text` relative to an explicit `now`.
pub(crate) fn parse_at(text: &str, now: DateTime<Utc>) -> DriverResult<Timestamp> {
    let trimmed = text.trim();

    // A bare numeric literal is already an absolute instant.
    if let Ok(micros) = trimmed.parse::<i64>() {
        return Ok(Timestamp::from_micros(micros));
    }

    let lower = trimmed.to_ascii_lowercase();
    match lower.as_str() {
        "now" => return Ok(to_timestamp(now)),
        "today" => return Ok(to_timestamp(midnight(now))),
        "yesterday" => return Ok(to_timestamp(midnight(now) - Duration::days(1))),
        "tomorrow" => return Ok(to_timestamp(midnight(now) + Duration::days(1))),
        _ => {}
    }

    if let Some(instant) = parse_relative(&lower, now) {
        return Ok(to_timestamp(instant));
    }

    if let Some(instant) = parse_absolute(trimmed) {
        return Ok(to_timestamp(instant));
    }

    Err(DriverError::TimeParse(text.to_string()))
}

/// `"N <unit> ago"` and `"in N <unit>"` forms.
fn parse_relative(lower: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let words: Vec<&str> = lower.split_whitespace().collect();
    match words.as_slice() {
        [count, unit, "ago"] => {
            let delta = unit_duration(unit, count.parse().ok()?)?;
            now.checked_sub_signed(delta)
        }
        ["in", count, unit] => {
            let delta = unit_duration(unit, count.parse().ok()?)?;
            now.checked_add_signed(delta)
        }
        _ => None,
    }
}

fn unit_duration(unit: &str, count: i64) -> Option<Duration> {
    match unit {
        "microsecond" | "microseconds" | "us" => Some(Duration::microseconds(count)),
        "millisecond" | "milliseconds" | "ms" => Duration::try_milliseconds(count),
        "second" | "seconds" | "sec" | "secs" => Duration::try_seconds(count),
        "minute" | "minutes" | "min" | "mins" => Duration::try_minutes(count),
        "hour" | "hours" | "hr" | "hrs" => Duration::try_hours(count),
        "day" | "days" => Duration::try_days(count),
        "week" | "weeks" => Duration::try_weeks(count),
        // Calendar months and years are approximated with fixed lengths.
        "month" | "months" => Duration::try_days(count.checked_mul(30)?),
        "year" | "years" => Duration::try_days(count.checked_mul(365)?),
        _ => None,
    }
}

/// RFC 3339 and common calendar forms.
fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

fn midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

fn to_timestamp(instant: DateTime<Utc>) -> Timestamp {
    Timestamp::from_micros(instant.timestamp_micros())
}

#[cfg(test)]
mod time_tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn numeric_literal_passes_through_exactly() {
        let ts = parse_at("1700000000000", anchor()).unwrap();
        assert_eq!(ts.as_micros(), 1_700_000_000_000);
    }

    #[test]
    fn seconds_ago_is_before_now() {
        let now = anchor();
        let ts = parse_at("3 seconds ago", now).unwrap();
        assert_eq!(ts.as_micros(), now.timestamp_micros() - 3_000_000);
        assert!(ts.as_micros() < now.timestamp_micros());
    }

    #[test]
    fn in_two_hours_is_after_now() {
        let now = anchor();
        let ts = parse_at("in 2 hours", now).unwrap();
        assert_eq!(ts.as_micros(), now.timestamp_micros() + 2 * 3_600_000_000);
    }

    #[test]
    fn named_anchors() {
        let now = anchor();
        assert_eq!(
            parse_at("now", now).unwrap().as_micros(),
            now.timestamp_micros()
        );
        let today = parse_at("today", now).unwrap();
        assert_eq!(today.as_micros() % 86_400_000_000, 0);
        let yesterday = parse_at("yesterday", now).unwrap();
        assert_eq!(
            today.as_micros() - yesterday.as_micros(),
            86_400_000_000
        );
    }

    #[test]
    fn calendar_forms() {
        let ts = parse_at("2024-01-02", anchor()).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(ts.as_micros(), expected.timestamp_micros());

        let ts = parse_at("2024-01-02 03:04:05", anchor()).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(ts.as_micros(), expected.timestamp_micros());

        let ts = parse_at("2024-01-02T03:04:05Z", anchor()).unwrap();
        assert_eq!(ts.as_micros(), expected.timestamp_micros());
    }

    #[test]
    fn case_and_whitespace_are_forgiven() {
        let now = anchor();
        assert!(parse_at("  5 Minutes AGO  ", now).is_ok());
    }

    #[test]
    fn unrecognized_phrases_fail() {
        for bad in ["a while back", "5 fortnights ago", "ago", ""] {
            assert!(matches!(
                parse_at(bad, anchor()),
                Err(DriverError::TimeParse(_))
            ));
        }
    }
}
