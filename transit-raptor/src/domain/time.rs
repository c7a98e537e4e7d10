//! Service-day time handling.
//!
//! The search works on seconds since midnight of the service day. Trips that
//! run past midnight keep counting (`25:10:00` is 90_600 seconds), so times
//! are parsed and printed in that extended form rather than wrapped.

use chrono::NaiveTime;
use serde::Deserialize;

use super::constants::is_sentinel;

const SECONDS_PER_DAY: i32 = 24 * 60 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a time in `HH:MM` or `HH:MM:SS` format to seconds since midnight.
///
/// Hours up to 47 are accepted for trips running past midnight.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::parse_time;
///
/// assert_eq!(parse_time("08:00").unwrap(), 8 * 3600);
/// assert_eq!(parse_time("08:00:30").unwrap(), 8 * 3600 + 30);
/// assert_eq!(parse_time("25:10").unwrap(), 25 * 3600 + 600);
///
/// assert!(parse_time("8:00").is_err());
/// assert!(parse_time("08:60").is_err());
/// assert!(parse_time("48:00").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<i32, TimeError> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 && bytes.len() != 8 {
        return Err(TimeError::new("expected HH:MM or HH:MM:SS format"));
    }
    if bytes[2] != b':' || (bytes.len() == 8 && bytes[5] != b':') {
        return Err(TimeError::new("expected colon separators"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 47 {
        return Err(TimeError::new("hour must be 0-47"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    let second = if bytes.len() == 8 {
        let second = parse_two_digits(&bytes[6..8])
            .ok_or_else(|| TimeError::new("invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        second
    } else {
        0
    };

    Ok((hour * 3600 + minute * 60 + second) as i32)
}

/// Format seconds since midnight as `HH:MM:SS`.
///
/// Times on the following (or previous) day get a `+1d` (or `-1d`) suffix,
/// and reserved sentinel values print as `-`.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::{format_time, UNREACHED_HIGH};
///
/// assert_eq!(format_time(8 * 3600 + 5 * 60), "08:05:00");
/// assert_eq!(format_time(25 * 3600), "01:00:00+1d");
/// assert_eq!(format_time(UNREACHED_HIGH), "-");
/// ```
pub fn format_time(seconds: i32) -> String {
    if is_sentinel(seconds) {
        return "-".to_string();
    }
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    let in_day = seconds.rem_euclid(SECONDS_PER_DAY) as u32;

    let time = match NaiveTime::from_num_seconds_from_midnight_opt(in_day, 0) {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => return "-".to_string(),
    };

    match days {
        0 => time,
        d if d > 0 => format!("{time}+{d}d"),
        d => format!("{time}{d}d"),
    }
}

/// Format a duration in seconds as a compact `1h05m30s` string.
pub fn format_duration(seconds: i32) -> String {
    if is_sentinel(seconds) {
        return "-".to_string();
    }
    let sign = if seconds < 0 { "-" } else { "" };
    let s = seconds.unsigned_abs();
    let (h, m, sec) = (s / 3600, (s % 3600) / 60, s % 60);

    let mut out = String::from(sign);
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if h > 0 || m > 0 {
        out.push_str(&format!("{m:02}m"));
    }
    if sec > 0 || (h == 0 && m == 0) {
        out.push_str(&format!("{sec:02}s"));
    }
    out
}

/// A time as written in JSON input: seconds since midnight or `HH:MM[:SS]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ClockTime {
    Seconds(i32),
    Text(String),
}

impl ClockTime {
    pub fn seconds(&self) -> Result<i32, TimeError> {
        match self {
            ClockTime::Seconds(seconds) => Ok(*seconds),
            ClockTime::Text(text) => parse_time(text),
        }
    }
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
        return None;
    }
    Some(((bytes[0] - b'0') * 10 + (bytes[1] - b'0')) as u32)
}
