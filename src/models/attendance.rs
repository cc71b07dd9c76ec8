//! Attendance records and reconciled calendar days.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::employee::EmployeeInfo;
use super::status::AttendanceStatus;
use crate::engine::time_metrics;

/// Geographic location captured with a check-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: String,
}

/// Check-in event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    /// Local wall-clock time. `None` when the provider sent an unparseable value.
    pub time: Option<NaiveDateTime>,
    pub device_info: String,
    pub location: Location,
}

/// Check-out event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOut {
    pub time: Option<NaiveDateTime>,
}

/// Normalized attendance record, one per employee per work day.
///
/// Non-working statuses carry no check events and zero work hours;
/// `late_by` is `None` unless `is_late`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub employee: Option<EmployeeInfo>,
    pub check_in: Option<CheckIn>,
    pub check_out: Option<CheckOut>,
    pub work_hours: f64,
    pub is_late: bool,
    pub late_by: Option<i64>,
    pub is_short_attendance: bool,
    pub short_by_minutes: Option<i64>,
}

impl AttendanceRecord {
    /// Create a record with no check events and zeroed metrics.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            status,
            employee: None,
            check_in: None,
            check_out: None,
            work_hours: 0.0,
            is_late: false,
            late_by: None,
            is_short_attendance: false,
            short_by_minutes: None,
        }
    }

    /// Check-in time, if known.
    pub fn check_in_time(&self) -> Option<NaiveDateTime> {
        self.check_in.as_ref().and_then(|c| c.time)
    }

    /// Check-out time, if known.
    pub fn check_out_time(&self) -> Option<NaiveDateTime> {
        self.check_out.as_ref().and_then(|c| c.time)
    }

    /// Calculate work duration in hours from check-in and check-out times.
    pub fn calculate_work_hours(&self) -> f64 {
        time_metrics::work_hours(self.check_in_time(), self.check_out_time())
    }

    /// Minutes late, zero when on time.
    pub fn late_minutes(&self) -> i64 {
        if self.is_late { self.late_by.unwrap_or(0) } else { 0 }
    }
}

/// One calendar day of a reconciled range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledDay {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub record: Option<AttendanceRecord>,
}

impl ReconciledDay {
    /// Work hours recorded for the day, zero without a record.
    pub fn work_hours(&self) -> f64 {
        self.record.as_ref().map_or(0.0, |r| r.work_hours)
    }

    /// Whether the day's record is flagged late.
    pub fn is_late(&self) -> bool {
        self.record.as_ref().is_some_and(|r| r.is_late)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_calculate_work_hours() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut record = AttendanceRecord::new("E1", date, AttendanceStatus::Present);
        record.check_in = Some(CheckIn {
            time: Some(at(date, 9, 0)),
            ..Default::default()
        });
        record.check_out = Some(CheckOut {
            time: Some(at(date, 17, 30)),
        });

        assert!((record.calculate_work_hours() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_late_minutes_ignored_when_not_late() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut record = AttendanceRecord::new("E1", date, AttendanceStatus::Present);
        record.late_by = Some(15);
        assert_eq!(record.late_minutes(), 0);

        record.is_late = true;
        assert_eq!(record.late_minutes(), 15);
    }

    #[test]
    fn test_serializes_camel_case() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let record = AttendanceRecord::new("E1", date, AttendanceStatus::OnLeave);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["employeeId"], "E1");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["status"], "on-leave");
        assert_eq!(json["workHours"], 0.0);
    }
}
