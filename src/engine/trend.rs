//! Trailing-window trend series for charts.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::ReconciledDay;

/// Default trailing window, in days.
pub const DEFAULT_TREND_WINDOW: usize = 30;

/// One charted day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// `MM/DD`
    pub label: String,
    pub work_hours: f64,
    pub late_minutes: i64,
}

/// Parallel series sharing one x-axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub work_hours: Vec<f64>,
    pub late_minutes: Vec<i64>,
}

impl TrendSeries {
    pub fn from_points(points: &[TrendPoint]) -> Self {
        Self {
            labels: points.iter().map(|p| p.label.clone()).collect(),
            work_hours: points.iter().map(|p| p.work_hours).collect(),
            late_minutes: points.iter().map(|p| p.late_minutes).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Project the trailing `window_size` days into chart points, oldest first.
///
/// Input order does not matter. Days without a record are left out of the
/// series instead of being plotted as zero hours, and short histories are
/// never padded.
pub fn build_series(days: &[ReconciledDay], window_size: usize) -> Vec<TrendPoint> {
    let mut ordered: Vec<&ReconciledDay> = days.iter().collect();
    ordered.sort_by_key(|day| day.date);

    let start = ordered.len().saturating_sub(window_size);
    ordered[start..]
        .iter()
        .filter_map(|day| {
            day.record.as_ref().map(|record| TrendPoint {
                date: day.date,
                label: day.date.format("%m/%d").to_string(),
                work_hours: record.work_hours,
                late_minutes: record.late_minutes(),
            })
        })
        .collect()
}
