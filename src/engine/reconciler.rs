//! Calendar reconciliation: one entry per day in a range.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{Months, NaiveDate};
use tracing::{debug, warn};

use super::classifier::classify;
use crate::error::{AppError, Result};
use crate::models::{AttendanceRecord, ReconciledDay};

/// Number of days from `start` to `end` (zero when equal).
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Join sparse records against every day of `[range_start, range_end]`.
///
/// Days without a record become non-working days. When two records share a
/// date the first one wins and the duplicate is logged. An inverted range
/// yields no days.
pub fn reconcile(records: &[AttendanceRecord], range_start: NaiveDate, range_end: NaiveDate) -> Vec<ReconciledDay> {
    if range_start > range_end {
        warn!("Inverted reconciliation range {range_start}..{range_end}, returning no days");
        return Vec::new();
    }

    let mut by_date: HashMap<NaiveDate, &AttendanceRecord> = HashMap::with_capacity(records.len());
    for record in records.iter().filter(|r| (range_start..=range_end).contains(&r.date)) {
        match by_date.entry(record.date) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(kept) => {
                warn!(
                    date = %record.date,
                    kept = %kept.get().employee_id,
                    dropped = %record.employee_id,
                    "Duplicate attendance record for date, keeping first"
                );
            }
        }
    }

    let days: Vec<ReconciledDay> = range_start
        .iter_days()
        .take_while(|date| *date <= range_end)
        .map(|date| {
            let record = by_date.get(&date).copied();
            ReconciledDay {
                date,
                status: classify(record),
                record: record.cloned(),
            }
        })
        .collect();

    debug!(
        "Reconciled {} records into {} days ({range_start}..{range_end})",
        by_date.len(),
        days.len()
    );
    days
}

/// First and last day of a calendar month.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Reconcile a whole calendar month.
pub fn reconcile_month(records: &[AttendanceRecord], year: i32, month: u32) -> Result<Vec<ReconciledDay>> {
    let (start, end) =
        month_range(year, month).ok_or_else(|| AppError::validation(format!("Invalid month {year}-{month}")))?;
    Ok(reconcile(records, start, end))
}
