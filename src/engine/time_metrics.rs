//! Lateness, work duration, and time display helpers.

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Display value for a missing or unparseable time.
pub const UNKNOWN: &str = "-";

/// Naive formats accepted after RFC 3339 fails. `%.f` makes the fraction optional.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Lateness of a single check-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lateness {
    pub is_late: bool,
    pub late_by_minutes: i64,
}

/// Shortfall against the required daily hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortAttendance {
    pub is_short: bool,
    pub short_by_minutes: i64,
}

/// Scheduled start with a grace period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatenessPolicy {
    pub scheduled_start: NaiveTime,
    pub grace_minutes: i64,
}

impl LatenessPolicy {
    pub fn new(scheduled_start: NaiveTime, grace_minutes: i64) -> Self {
        Self {
            scheduled_start,
            grace_minutes: grace_minutes.max(0),
        }
    }

    /// Late only past the grace period; the reported delta is still measured
    /// from the scheduled start.
    pub fn evaluate(&self, check_in: NaiveDateTime) -> Lateness {
        let lateness = compute_lateness(self.scheduled_start, check_in);
        if lateness.late_by_minutes > self.grace_minutes {
            lateness
        } else {
            Lateness::default()
        }
    }
}

/// Parse a provider timestamp into local wall-clock time.
///
/// Accepts RFC 3339 (the wall-clock part is kept as written, no timezone
/// conversion) and `YYYY-MM-DD HH:mm[:ss]` with either a space or `T`.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

/// Compare a check-in against the scheduled start, in whole minutes.
pub fn compute_lateness(scheduled_start: NaiveTime, check_in: NaiveDateTime) -> Lateness {
    let late_by = (check_in.time() - scheduled_start).num_minutes();
    if late_by > 0 {
        Lateness {
            is_late: true,
            late_by_minutes: late_by,
        }
    } else {
        Lateness::default()
    }
}

/// Hours between check-in and check-out, clamped to zero.
pub fn work_hours(check_in: Option<NaiveDateTime>, check_out: Option<NaiveDateTime>) -> f64 {
    match (check_in, check_out) {
        (Some(start), Some(end)) => ((end - start).num_seconds() as f64 / 3600.0).max(0.0),
        _ => 0.0,
    }
}

/// Format fractional hours as `"{h}h {m}m"`, rounded to the nearest minute.
pub fn format_duration(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0h 0m".to_string();
    }
    let total_minutes = (hours * 60.0).round() as i64;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Format a check time as `hh:mm AM`, or `-` when unknown.
pub fn format_clock(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format("%I:%M %p").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Parse and format a raw timestamp string; malformed input yields `-`.
pub fn format_timestamp(raw: &str) -> String {
    format_clock(parse_timestamp(raw))
}

/// Compare worked hours with the required daily hours.
pub fn short_attendance(work_hours: f64, required_hours: f64) -> ShortAttendance {
    if !work_hours.is_finite() || !required_hours.is_finite() || required_hours <= 0.0 {
        return ShortAttendance::default();
    }
    let worked = (work_hours.max(0.0) * 60.0).round() as i64;
    let required = (required_hours * 60.0).round() as i64;
    if worked < required {
        ShortAttendance {
            is_short: true,
            short_by_minutes: required - worked,
        }
    } else {
        ShortAttendance::default()
    }
}
