//! Day status classification.

use crate::models::{AttendanceRecord, AttendanceStatus};

/// Status for a single day given its record, if any.
///
/// A missing record is a non-working day, never an absence: absences need an
/// explicit record.
pub fn classify(record: Option<&AttendanceRecord>) -> AttendanceStatus {
    record.map_or(AttendanceStatus::NonWorkingDay, |r| r.status)
}
