//! Attendance aggregation and calendar reconciliation.
//!
//! Every function here is a pure transformation over plain data: callers
//! pass records in and get freshly built views back.
//!
//! # Example
//!
//! ```
//! use attendance_calendar::engine::{aggregate, build_series, reconcile};
//! use attendance_calendar::models::{AttendanceRecord, AttendanceStatus};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
//! let records = vec![AttendanceRecord::new("EMP-001", start, AttendanceStatus::Present)];
//!
//! let days = reconcile(&records, start, end);
//! assert_eq!(days.len(), 3);
//! assert_eq!(aggregate(&days).present_days, 1);
//! assert_eq!(build_series(&days, 30).len(), 1);
//! ```

pub mod classifier;
pub mod filter;
pub mod reconciler;
pub mod stats;
pub mod time_metrics;
pub mod trend;


pub use classifier::classify;
pub use filter::{FilterCriteria, Searchable, StatusFilter, filter};
pub use reconciler::{days_between, month_range, reconcile, reconcile_month};
pub use stats::{AttendanceStats, DailyStats, MonthlyBreakdown, MonthlyStats, aggregate, aggregate_by_month};
pub use time_metrics::{Lateness, LatenessPolicy, ShortAttendance, compute_lateness, format_duration, work_hours};
pub use trend::{DEFAULT_TREND_WINDOW, TrendPoint, TrendSeries, build_series};
