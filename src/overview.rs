//! Single-day attendance overview across all employees.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::ingest::AttendanceBatch;
use crate::models::{AttendanceRecord, AttendanceStatus};

/// Dashboard counts for one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyOverview {
    pub date: NaiveDate,
    pub total_employees: usize,
    /// Distinct employees with a record on the date.
    pub recorded: usize,
    /// Present and half-day.
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub on_leave: usize,
    /// Public holiday and combo-off.
    pub off_duty: usize,
    pub not_marked: usize,
    pub attendance_rate: f64,
}

impl DailyOverview {
    /// Summarize a normalized provider batch, cross-checking its present count.
    pub fn from_batch(batch: &AttendanceBatch, date: NaiveDate) -> Self {
        let overview = summarize_day(&batch.records, date, batch.total_employees);
        if let Some(provider_present) = batch.present_count {
            overview.cross_check(provider_present);
        }
        overview
    }

    /// Compare with the provider's present count; mismatches are logged.
    pub fn cross_check(&self, provider_present: usize) -> bool {
        if self.present == provider_present {
            true
        } else {
            warn!(
                date = %self.date,
                local = self.present,
                provider = provider_present,
                "Present count differs from provider summary"
            );
            false
        }
    }
}

/// Count one record per employee on `date`.
///
/// Without a `total_employees` figure the distinct recorded employees are
/// the total. The rate denominator never drops below the number of employees actually
/// recorded, so an undersized `total_employees` cannot push it past 100%.
pub fn summarize_day(records: &[AttendanceRecord], date: NaiveDate, total_employees: Option<usize>) -> DailyOverview {
    let mut by_employee: HashMap<&str, &AttendanceRecord> = HashMap::new();
    for record in records.iter().filter(|r| r.date == date) {
        match by_employee.entry(record.employee_id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(_) => {
                warn!(employee = %record.employee_id, %date, "Duplicate record for employee, keeping first");
            }
        }
    }

    let recorded = by_employee.len();
    let total_employees = total_employees.unwrap_or(recorded);
    let mut overview = DailyOverview {
        date,
        total_employees,
        recorded,
        ..Default::default()
    };

    for record in by_employee.values() {
        match record.status {
            AttendanceStatus::Present | AttendanceStatus::HalfDay => overview.present += 1,
            AttendanceStatus::Absent => overview.absent += 1,
            AttendanceStatus::OnLeave => overview.on_leave += 1,
            AttendanceStatus::PublicHoliday | AttendanceStatus::ComboOff => overview.off_duty += 1,
            AttendanceStatus::NonWorkingDay => {}
        }
        if record.is_late {
            overview.late += 1;
        }
    }

    overview.not_marked = total_employees.saturating_sub(overview.recorded);
    let denominator = total_employees.max(overview.recorded);
    if denominator > 0 {
        overview.attendance_rate = overview.present as f64 / denominator as f64 * 100.0;
    }
    overview
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn record(id: &str, d: u32, status: AttendanceStatus, late: bool) -> AttendanceRecord {
        let mut record = AttendanceRecord::new(id, date(d), status);
        record.is_late = late;
        record
    }

    fn sample() -> Vec<AttendanceRecord> {
        vec![
            record("E1", 1, AttendanceStatus::Present, true),
            record("E2", 1, AttendanceStatus::HalfDay, false),
            record("E3", 1, AttendanceStatus::Absent, false),
            record("E4", 1, AttendanceStatus::OnLeave, false),
            record("E1", 2, AttendanceStatus::Present, false),
        ]
    }

    #[test]
    fn test_summarize_day() {
        let overview = summarize_day(&sample(), date(1), Some(10));

        assert_eq!(overview.recorded, 4);
        assert_eq!(overview.present, 2);
        assert_eq!(overview.absent, 1);
        assert_eq!(overview.on_leave, 1);
        assert_eq!(overview.late, 1);
        assert_eq!(overview.not_marked, 6);
        assert!((overview.attendance_rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_employee_counted_once() {
        let mut records = sample();
        records.push(record("E3", 1, AttendanceStatus::Present, false));
        let overview = summarize_day(&records, date(1), Some(4));
        assert_eq!(overview.present, 2);
        assert_eq!(overview.absent, 1);
    }

    #[test]
    fn test_no_employees_has_zero_rate() {
        let overview = summarize_day(&[], date(1), Some(0));
        assert_eq!(overview.attendance_rate, 0.0);
        assert_eq!(overview.not_marked, 0);
    }

    #[test]
    fn test_undersized_total_caps_rate() {
        let overview = summarize_day(&sample(), date(1), Some(2));
        assert_eq!(overview.not_marked, 0);
        assert!((overview.attendance_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_total_falls_back_to_recorded() {
        let mut records = sample();
        records.push(record("E2", 1, AttendanceStatus::Present, false));
        let overview = summarize_day(&records, date(1), None);
        assert_eq!(overview.total_employees, 4);
        assert_eq!(overview.not_marked, 0);
        assert!((overview.attendance_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_batch_cross_check() {
        let batch = AttendanceBatch {
            records: sample(),
            total_employees: None,
            present_count: Some(2),
        };
        let overview = DailyOverview::from_batch(&batch, date(1));
        assert_eq!(overview.total_employees, 4);
        assert!(overview.cross_check(2));
        assert!(!overview.cross_check(3));
    }
}
