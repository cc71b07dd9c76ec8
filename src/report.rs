//! Per-employee calendar report combining reconciliation, stats, and trend.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::engine::{
    self, AttendanceStats, FilterCriteria, MonthlyBreakdown, TrendPoint, TrendSeries, aggregate, aggregate_by_month,
    build_series, reconcile,
};
use crate::models::{AttendanceRecord, ReconciledDay};

/// Everything a calendar/detail view needs for one range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarReport {
    pub employee_id: Option<String>,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub days: Vec<ReconciledDay>,
    pub stats: AttendanceStats,
    pub monthly: Vec<MonthlyBreakdown>,
    pub trend: Vec<TrendPoint>,
}

impl CalendarReport {
    /// Build from records that already belong to a single employee.
    pub fn build(records: &[AttendanceRecord], range_start: NaiveDate, range_end: NaiveDate, trend_window: usize) -> Self {
        let days = reconcile(records, range_start, range_end);
        let stats = aggregate(&days);
        let monthly = aggregate_by_month(&days);
        let trend = build_series(&days, trend_window);

        Self {
            employee_id: None,
            range_start,
            range_end,
            days,
            stats,
            monthly,
            trend,
        }
    }

    /// Build for one employee out of a mixed record set.
    pub fn for_employee(
        records: &[AttendanceRecord],
        employee_id: &str,
        range_start: NaiveDate,
        range_end: NaiveDate,
        trend_window: usize,
    ) -> Self {
        let own: Vec<AttendanceRecord> = records
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        info!(
            "Building report for {employee_id}: {} of {} records, {range_start}..{range_end}",
            own.len(),
            records.len()
        );

        Self {
            employee_id: Some(employee_id.to_string()),
            ..Self::build(&own, range_start, range_end, trend_window)
        }
    }

    /// Days matching a search/status filter.
    pub fn filtered_days(&self, criteria: &FilterCriteria) -> Vec<ReconciledDay> {
        engine::filter(&self.days, criteria)
    }

    /// Trend as parallel chart series.
    pub fn trend_series(&self) -> TrendSeries {
        TrendSeries::from_points(&self.trend)
    }
}
