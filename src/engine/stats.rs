//! Summary statistics over reconciled days.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::models::{AttendanceStatus, ReconciledDay};

/// Counts and rates for a set of reconciled days.
///
/// Always recomputed from scratch; never updated in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_days: usize,
    /// Present and half-day.
    pub present_days: usize,
    pub absent_days: usize,
    pub late_days: usize,
    pub on_leave_days: usize,
    pub half_days: usize,
    pub public_holiday_days: usize,
    pub combo_off_days: usize,
    pub non_working_days: usize,
    pub total_work_hours: f64,
    /// Zero when there are no present days.
    pub average_work_hours: f64,
    /// Percentage of present days that were not late.
    pub punctuality_rate: f64,
}

/// Name used for per-range calendar stats in reports. Cross-employee
/// single-day counts live in [`crate::overview::DailyOverview`].
pub type DailyStats = AttendanceStats;

/// Stats over one calendar month.
pub type MonthlyStats = AttendanceStats;

/// Stats for one `(year, month)` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    pub year: i32,
    pub month: u32,
    pub stats: MonthlyStats,
}

/// Reduce reconciled days into summary counts and rates.
pub fn aggregate(days: &[ReconciledDay]) -> AttendanceStats {
    aggregate_iter(days)
}

/// Aggregate per calendar month, oldest month first.
pub fn aggregate_by_month(days: &[ReconciledDay]) -> Vec<MonthlyBreakdown> {
    let mut buckets: BTreeMap<(i32, u32), Vec<&ReconciledDay>> = BTreeMap::new();
    for day in days {
        buckets.entry((day.date.year(), day.date.month())).or_default().push(day);
    }

    buckets
        .into_iter()
        .map(|((year, month), days)| MonthlyBreakdown {
            year,
            month,
            stats: aggregate_iter(days),
        })
        .collect()
}

fn aggregate_iter<'a>(days: impl IntoIterator<Item = &'a ReconciledDay>) -> AttendanceStats {
    let mut stats = AttendanceStats::default();
    let mut late_present_days = 0usize;

    for day in days {
        stats.total_days += 1;

        match day.status {
            AttendanceStatus::Present => stats.present_days += 1,
            AttendanceStatus::HalfDay => {
                stats.present_days += 1;
                stats.half_days += 1;
            }
            AttendanceStatus::Absent => stats.absent_days += 1,
            AttendanceStatus::OnLeave => stats.on_leave_days += 1,
            AttendanceStatus::PublicHoliday => stats.public_holiday_days += 1,
            AttendanceStatus::ComboOff => stats.combo_off_days += 1,
            AttendanceStatus::NonWorkingDay => stats.non_working_days += 1,
        }

        if day.is_late() {
            stats.late_days += 1;
            if day.status.counts_as_present() {
                late_present_days += 1;
            }
        }

        stats.total_work_hours += day.work_hours();
    }

    if stats.present_days > 0 {
        let present = stats.present_days as f64;
        stats.average_work_hours = stats.total_work_hours / present;
        stats.punctuality_rate = (stats.present_days - late_present_days) as f64 / present * 100.0;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceRecord;
    use chrono::NaiveDate;

    fn day(d: u32, status: AttendanceStatus, hours: f64, late: bool) -> ReconciledDay {
        let date = NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let mut record = AttendanceRecord::new("E1", date, status);
        record.work_hours = hours;
        record.is_late = late;
        ReconciledDay {
            date,
            status,
            record: Some(record),
        }
    }

    fn empty_day(d: u32) -> ReconciledDay {
        ReconciledDay {
            date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            status: AttendanceStatus::NonWorkingDay,
            record: None,
        }
    }

    #[test]
    fn test_empty_input_has_no_nan() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.average_work_hours, 0.0);
        assert_eq!(stats.punctuality_rate, 0.0);
    }

    #[test]
    fn test_counts_per_status() {
        let days = vec![
            day(1, AttendanceStatus::Present, 8.0, false),
            day(2, AttendanceStatus::HalfDay, 4.0, true),
            day(3, AttendanceStatus::Absent, 0.0, false),
            day(4, AttendanceStatus::OnLeave, 0.0, false),
            day(5, AttendanceStatus::PublicHoliday, 0.0, false),
            day(6, AttendanceStatus::ComboOff, 0.0, false),
            empty_day(7),
        ];
        let stats = aggregate(&days);

        assert_eq!(stats.total_days, 7);
        assert_eq!(stats.present_days, 2);
        assert_eq!(stats.half_days, 1);
        assert_eq!(stats.absent_days, 1);
        assert_eq!(stats.on_leave_days, 1);
        assert_eq!(stats.public_holiday_days, 1);
        assert_eq!(stats.combo_off_days, 1);
        assert_eq!(stats.non_working_days, 1);
        assert_eq!(stats.late_days, 1);
        assert!((stats.total_work_hours - 12.0).abs() < 1e-9);
        assert!((stats.average_work_hours - 6.0).abs() < 1e-9);
        assert!((stats.punctuality_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_working_days_never_count_as_absent() {
        let days: Vec<_> = (1..=5).map(empty_day).collect();
        let stats = aggregate(&days);
        assert_eq!(stats.absent_days, 0);
        assert_eq!(stats.non_working_days, 5);
        assert_eq!(stats.average_work_hours, 0.0);
    }

    #[test]
    fn test_aggregate_by_month() {
        let march = day(31, AttendanceStatus::Present, 8.0, false);
        let april = ReconciledDay {
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            ..day(1, AttendanceStatus::Absent, 0.0, false)
        };
        let breakdown = aggregate_by_month(&[april, march]);

        assert_eq!(breakdown.len(), 2);
        assert_eq!((breakdown[0].year, breakdown[0].month), (2024, 3));
        assert_eq!(breakdown[0].stats.present_days, 1);
        assert_eq!((breakdown[1].year, breakdown[1].month), (2024, 4));
        assert_eq!(breakdown[1].stats.absent_days, 1);
    }
}
