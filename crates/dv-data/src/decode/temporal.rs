//! Date and time parsing for temporal columns

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::config::DatetimeZone;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Check for exactly eight ASCII digits
pub fn is_compact_date(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Parse `YYYYMMDD` to UTC midnight. Dates that would roll over into the
/// next month (`20250230`) are rejected.
pub fn parse_compact_date(s: &str) -> Option<DateTime<Utc>> {
    if !is_compact_date(s) {
        return None;
    }

    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    midnight_utc(NaiveDate::from_ymd_opt(year, month, day)?)
}

/// Parse a `DATE` cell in either `YYYYMMDD` or `YYYY-MM-DD` form
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if is_compact_date(s) {
        parse_compact_date(s)
    } else if is_iso_date(s) {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(midnight_utc)
    } else {
        None
    }
}

fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    let millis = (secs * 1000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Parse a `TIMESTAMP` cell: epoch seconds (number or numeric text,
/// scientific notation included) or an ISO-like date-time string
pub fn parse_timestamp(raw: &serde_json::Value) -> Option<DateTime<Utc>> {
    match raw {
        serde_json::Value::Number(n) => from_epoch_seconds(n.as_f64()?),
        serde_json::Value::String(s) => {
            let s = s.trim();
            match s.parse::<f64>() {
                Ok(secs) if secs.is_finite() => from_epoch_seconds(secs),
                _ => parse_iso_timestamp(s),
            }
        }
        _ => None,
    }
}

fn parse_iso_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let normalized = match s.strip_suffix(" UTC") {
        Some(rest) => format!("{}Z", rest.replacen(' ', "T", 1)),
        None => s.replacen(' ', "T", 1),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, DATETIME_FORMAT) {
        return Some(naive.and_utc());
    }
    if is_iso_date(&normalized) {
        return parse_date(&normalized);
    }
    None
}

/// Parse a wall-clock `DATETIME` cell such as `2025-02-17 10:20:30` or
/// `2025-02-17T10:20:30.123456`, anchored according to `zone`
pub fn parse_datetime(s: &str, zone: DatetimeZone) -> Option<DateTime<Utc>> {
    let mut normalized = s.trim().replacen(' ', "T", 1);
    let time_part = normalized.split_once('T').map(|(_, t)| t)?;
    if !time_part.contains('.') {
        normalized.push_str(".000");
    }

    let naive = NaiveDateTime::parse_from_str(&normalized, DATETIME_FORMAT).ok()?;
    match zone {
        DatetimeZone::Utc => Some(naive.and_utc()),
        DatetimeZone::Local => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}
