//! Normalization of provider JSON into canonical attendance records.
//!
//! Provider payloads are loosely typed: every field may be missing or null,
//! numbers sometimes arrive as strings, and timestamps mix ISO-8601 with
//! `YYYY-MM-DD HH:mm:ss`. Everything is resolved here so the engine only
//! ever sees [`AttendanceRecord`].

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ScheduleConfig;
use crate::engine::time_metrics::{self, LatenessPolicy};
use crate::error::{AppError, Result};
use crate::models::{AttendanceRecord, AttendanceStatus, CheckIn, CheckOut, EmployeeInfo, Location};

/// Raw record as sent by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAttendanceRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub employee_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_object")]
    pub employee: Option<RawEmployee>,
    #[serde(deserialize_with = "lenient_object")]
    pub check_in: Option<RawCheckIn>,
    #[serde(deserialize_with = "lenient_object")]
    pub check_out: Option<RawCheckOut>,
    #[serde(deserialize_with = "lenient_f64")]
    pub work_hours: Option<f64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_late: Option<bool>,
    #[serde(deserialize_with = "lenient_i64")]
    pub late_by: Option<i64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_short_attendance: Option<bool>,
    #[serde(deserialize_with = "lenient_i64")]
    pub short_by_minutes: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEmployee {
    #[serde(deserialize_with = "lenient_string")]
    pub employee_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Either a plain name or an object with a `name` field.
    #[serde(deserialize_with = "lenient_string")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCheckIn {
    #[serde(deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub device_info: Option<String>,
    #[serde(deserialize_with = "lenient_object")]
    pub location: Option<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCheckOut {
    #[serde(deserialize_with = "lenient_string")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLocation {
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub address: Option<String>,
}

/// Provider response body: records plus the provider's own summary counts.
///
/// Records stay as raw JSON until [`Ingestor::normalize_all`] so one
/// malformed entry cannot reject the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAttendancePayload {
    #[serde(alias = "data", deserialize_with = "lenient_array")]
    pub records: Vec<Value>,
    #[serde(deserialize_with = "lenient_usize")]
    pub total_employees: Option<usize>,
    #[serde(deserialize_with = "lenient_usize")]
    pub present_count: Option<usize>,
}

/// Normalized provider batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceBatch {
    pub records: Vec<AttendanceRecord>,
    pub total_employees: Option<usize>,
    pub present_count: Option<usize>,
}

/// Parse a provider body. A bare JSON array is accepted as a record list.
pub fn parse_payload(body: &str) -> Result<RawAttendancePayload> {
    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Array(records) => Ok(RawAttendancePayload {
            records,
            ..Default::default()
        }),
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        other => Err(AppError::parse(format!(
            "Expected an object or array of attendance records, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse a calendar date, accepting a full timestamp and keeping its date part.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| time_metrics::parse_timestamp(input).map(|t| t.date()))
}

/// Converts raw provider records into canonical records.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    lateness: Option<LatenessPolicy>,
    required_hours: Option<f64>,
}

impl Ingestor {
    /// Ingestor that never derives lateness or short attendance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingestor deriving lateness and short attendance from the configured schedule.
    pub fn from_schedule(schedule: &ScheduleConfig) -> Result<Self> {
        let policy = schedule
            .lateness_policy()
            .map_err(|e| AppError::config(e.to_string()))?;
        Ok(Self::new()
            .with_lateness_policy(policy)
            .with_required_hours(schedule.required_hours))
    }

    /// Derive `isLate`/`lateBy` from check-in when the provider omits them.
    pub fn with_lateness_policy(mut self, policy: LatenessPolicy) -> Self {
        self.lateness = Some(policy);
        self
    }

    /// Derive short attendance for present days when the provider omits it.
    pub fn with_required_hours(mut self, hours: f64) -> Self {
        self.required_hours = Some(hours);
        self
    }

    /// Normalize a whole payload, skipping records that cannot be used.
    pub fn ingest(&self, payload: RawAttendancePayload) -> AttendanceBatch {
        AttendanceBatch {
            records: self.normalize_all(payload.records),
            total_employees: payload.total_employees,
            present_count: payload.present_count,
        }
    }

    /// Normalize every raw JSON entry; invalid ones are logged and dropped.
    pub fn normalize_all(&self, entries: Vec<Value>) -> Vec<AttendanceRecord> {
        let total = entries.len();
        let records: Vec<AttendanceRecord> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| match self.normalize_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping attendance record #{idx}: {e}");
                    None
                }
            })
            .collect();

        if records.len() < total {
            warn!("Ingested {} of {} attendance records", records.len(), total);
        } else {
            debug!("Ingested {total} attendance records");
        }
        records
    }

    fn normalize_value(&self, entry: Value) -> Result<AttendanceRecord> {
        if !entry.is_object() {
            return Err(AppError::parse(format!("Expected a record object, got {}", json_kind(&entry))));
        }
        self.normalize(serde_json::from_value(entry)?)
    }

    /// Normalize one record.
    ///
    /// Fails only when the date or status is missing or unusable; every
    /// other field falls back to its empty value.
    pub fn normalize(&self, raw: RawAttendanceRecord) -> Result<AttendanceRecord> {
        let date = raw
            .date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| AppError::parse(format!("Missing or invalid date {:?}", raw.date)))?;
        let status: AttendanceStatus = raw
            .status
            .as_deref()
            .ok_or_else(|| AppError::parse(format!("Missing status for {date}")))?
            .parse()?;

        let employee = raw.employee.map(|e| EmployeeInfo {
            employee_id: e.employee_id.or_else(|| raw.employee_id.clone()).unwrap_or_default(),
            name: e.name.unwrap_or_default(),
            department: e.department,
        });
        let employee_id = raw
            .employee_id
            .or_else(|| employee.as_ref().map(|e| e.employee_id.clone()))
            .unwrap_or_default();

        let mut record = AttendanceRecord::new(employee_id, date, status);
        record.employee = employee;

        if !status.is_working_status() {
            if raw.check_in.is_some() || raw.work_hours.is_some_and(|h| h > 0.0) {
                debug!("Dropping check events from {status} record on {date}");
            }
            return Ok(record);
        }

        record.check_in = raw.check_in.map(|c| CheckIn {
            time: parse_event_time(c.time.as_deref(), "check-in", date),
            device_info: c.device_info.unwrap_or_default(),
            location: c
                .location
                .map(|l| Location {
                    latitude: l.latitude,
                    longitude: l.longitude,
                    address: l.address.unwrap_or_default(),
                })
                .unwrap_or_default(),
        });
        record.check_out = raw.check_out.map(|c| CheckOut {
            time: parse_event_time(c.time.as_deref(), "check-out", date),
        });

        let derived_hours = record.calculate_work_hours();
        record.work_hours = raw
            .work_hours
            .filter(|h| h.is_finite() && *h >= 0.0)
            .unwrap_or(derived_hours);

        let check_in_time = record.check_in_time();
        let derived = self
            .lateness
            .zip(check_in_time)
            .map(|(policy, time)| policy.evaluate(time));
        record.is_late = raw.is_late.or(derived.map(|l| l.is_late)).unwrap_or(false);
        record.late_by = if record.is_late {
            raw.late_by
                .or_else(|| {
                    self.lateness
                        .zip(check_in_time)
                        .map(|(policy, time)| time_metrics::compute_lateness(policy.scheduled_start, time).late_by_minutes)
                })
                .map(|m| m.max(0))
        } else {
            None
        };

        match raw.is_short_attendance {
            Some(is_short) => {
                record.is_short_attendance = is_short;
                record.short_by_minutes = if is_short { raw.short_by_minutes.map(|m| m.max(0)) } else { None };
            }
            None => {
                if let Some(required) = self.required_hours
                    && status == AttendanceStatus::Present
                {
                    let short = time_metrics::short_attendance(record.work_hours, required);
                    record.is_short_attendance = short.is_short;
                    record.short_by_minutes = short.is_short.then_some(short.short_by_minutes);
                }
            }
        }

        Ok(record)
    }
}

fn parse_event_time(raw: Option<&str>, field: &str, date: NaiveDate) -> Option<chrono::NaiveDateTime> {
    let raw = raw?;
    let parsed = time_metrics::parse_timestamp(raw);
    if parsed.is_none() {
        warn!("Unparseable {field} time '{raw}' on {date}");
    }
    parsed
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }))
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<i64>, D::Error> {
    Ok(lenient_f64(d)?.filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}

/// Nested object that degrades to `None` when its shape does not match.
fn lenient_object<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(d)?;
    Ok(value
        .filter(Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_array<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<Value>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        Some(Value::Array(entries)) => Ok(entries),
        Some(other) => {
            warn!("Expected a record array, got {}", json_kind(&other));
            Ok(Vec::new())
        }
        None => Ok(Vec::new()),
    }
}

fn lenient_usize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<usize>, D::Error> {
    Ok(lenient_i64(d)?.and_then(|n| usize::try_from(n).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn nine_am_policy() -> LatenessPolicy {
        LatenessPolicy::new(NaiveTime::from_hms_opt(9, 0, 0).unwrap(), 0)
    }

    fn raw(json: &str) -> RawAttendanceRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date("2024-03-01"), expected);
        assert_eq!(parse_date("2024-03-01T00:00:00.000Z"), expected);
        assert_eq!(parse_date("2024-03-01 23:59:59"), expected);
        assert_eq!(parse_date("03/01/2024"), None);
    }

    #[test]
    fn test_normalize_full_record() {
        let record = Ingestor::new()
            .normalize(raw(r#"{
                "employeeId": "EMP-001",
                "date": "2024-03-01",
                "status": "present",
                "employee": {"name": "Alice", "department": {"name": "Engineering"}},
                "checkIn": {"time": "2024-03-01T09:10:00", "deviceInfo": "iPhone",
                            "location": {"latitude": "10.77", "longitude": 106.7}},
                "checkOut": {"time": "2024-03-01 18:00:00"},
                "workHours": "8.83",
                "isLate": true,
                "lateBy": 10
            }"#))
            .unwrap();

        assert_eq!(record.employee_id, "EMP-001");
        assert_eq!(record.status, AttendanceStatus::Present);
        let employee = record.employee.as_ref().unwrap();
        assert_eq!(employee.employee_id, "EMP-001");
        assert_eq!(employee.department.as_deref(), Some("Engineering"));
        let check_in = record.check_in.as_ref().unwrap();
        assert_eq!(check_in.device_info, "iPhone");
        assert_eq!(check_in.location.latitude, Some(10.77));
        assert_eq!(check_in.location.address, "");
        assert_eq!(record.work_hours, 8.83);
        assert!(record.is_late);
        assert_eq!(record.late_by, Some(10));
    }

    #[test]
    fn test_missing_work_hours_are_derived() {
        let record = Ingestor::new()
            .normalize(raw(r#"{"date": "2024-03-01", "status": "present",
                "checkIn": {"time": "2024-03-01 09:00:00"}, "checkOut": {"time": "2024-03-01 17:30:00"}}"#))
            .unwrap();
        assert!((record.work_hours - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_time_degrades_to_unknown() {
        let record = Ingestor::new()
            .normalize(raw(r#"{"date": "2024-03-01", "status": "present",
                "checkIn": {"time": "garbage"}, "checkOut": {"time": null}}"#))
            .unwrap();
        assert_eq!(record.check_in_time(), None);
        assert_eq!(record.work_hours, 0.0);
        assert_eq!(time_metrics::format_clock(record.check_in_time()), "-");
    }

    #[test]
    fn test_non_working_status_is_stripped() {
        let record = Ingestor::new()
            .normalize(raw(r#"{"date": "2024-03-01", "status": "absent",
                "checkIn": {"time": "2024-03-01 09:00:00"}, "workHours": 3, "isLate": true, "lateBy": 5}"#))
            .unwrap();
        assert!(record.check_in.is_none());
        assert_eq!(record.work_hours, 0.0);
        assert!(!record.is_late);
        assert_eq!(record.late_by, None);
    }

    #[test]
    fn test_late_by_cleared_when_not_late() {
        let record = Ingestor::new()
            .normalize(raw(r#"{"date": "2024-03-01", "status": "present", "isLate": false, "lateBy": 12}"#))
            .unwrap();
        assert_eq!(record.late_by, None);
    }

    #[test]
    fn test_lateness_derived_from_policy() {
        let ingestor = Ingestor::new().with_lateness_policy(nine_am_policy());
        let record = ingestor
            .normalize(raw(r#"{"date": "2024-03-01", "status": "present",
                "checkIn": {"time": "2024-03-01 09:25:00"}}"#))
            .unwrap();
        assert!(record.is_late);
        assert_eq!(record.late_by, Some(25));

        let flagged = ingestor
            .normalize(raw(r#"{"date": "2024-03-01", "status": "present", "isLate": true,
                "checkIn": {"time": "2024-03-01 09:07:00"}}"#))
            .unwrap();
        assert_eq!(flagged.late_by, Some(7));
    }

    #[test]
    fn test_short_attendance_derived_for_present_days() {
        let ingestor = Ingestor::new().with_required_hours(8.0);
        let record = ingestor
            .normalize(raw(r#"{"date": "2024-03-01", "status": "present", "workHours": 7.5}"#))
            .unwrap();
        assert!(record.is_short_attendance);
        assert_eq!(record.short_by_minutes, Some(30));

        let half_day = ingestor
            .normalize(raw(r#"{"date": "2024-03-01", "status": "half-day", "workHours": 4}"#))
            .unwrap();
        assert!(!half_day.is_short_attendance);
    }

    #[test]
    fn test_from_schedule_applies_grace() {
        let schedule = ScheduleConfig {
            work_start: "09:00".to_string(),
            grace_minutes: 15,
            required_hours: 8.0,
        };
        let ingestor = Ingestor::from_schedule(&schedule).unwrap();
        let record = ingestor
            .normalize(raw(r#"{"date": "2024-03-01", "status": "present",
                "checkIn": {"time": "2024-03-01 09:10:00"}}"#))
            .unwrap();
        assert!(!record.is_late);
        assert_eq!(record.late_by, None);

        let bad = ScheduleConfig {
            work_start: "nine".to_string(),
            ..schedule
        };
        assert!(Ingestor::from_schedule(&bad).is_err());
    }

    #[test]
    fn test_invalid_records_are_rejected() {
        let ingestor = Ingestor::new();
        assert!(ingestor.normalize(raw(r#"{"status": "present"}"#)).is_err());
        assert!(ingestor.normalize(raw(r#"{"date": "2024-03-01"}"#)).is_err());
        assert!(ingestor.normalize(raw(r#"{"date": "2024-03-01", "status": "sick"}"#)).is_err());
    }

    #[test]
    fn test_ingest_skips_bad_records() {
        let payload = parse_payload(
            r#"{"records": [
                {"employeeId": 7, "date": "2024-03-01", "status": "present"},
                {"date": "not-a-date", "status": "present"},
                {"employeeId": "8", "date": "2024-03-01", "status": "on_leave"}
            ], "totalEmployees": "12", "presentCount": 1}"#,
        )
        .unwrap();
        let batch = Ingestor::new().ingest(payload);

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].employee_id, "7");
        assert_eq!(batch.records[1].status, AttendanceStatus::OnLeave);
        assert_eq!(batch.total_employees, Some(12));
        assert_eq!(batch.present_count, Some(1));
    }

    #[test]
    fn test_malformed_entries_do_not_reject_the_batch() {
        let payload = parse_payload(
            r#"{"records": [
                {"employeeId": "EMP-001", "date": "2024-03-01", "status": "present", "isLate": "true", "lateBy": 5},
                null,
                {"employeeId": "EMP-002", "date": "2024-03-01", "status": "present", "employee": "Bob"},
                {"employeeId": "EMP-003", "date": "2024-03-01", "status": "present",
                 "checkIn": "2024-03-01T09:00:00", "isShortAttendance": 1, "shortByMinutes": 20},
                {"employeeId": "EMP-004", "date": "2024-03-01", "status": "present",
                 "checkIn": {"time": "2024-03-01 09:00:00", "location": [1, 2]}}
            ]}"#,
        )
        .unwrap();
        let batch = Ingestor::new().ingest(payload);

        let ids: Vec<&str> = batch.records.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, ["EMP-001", "EMP-002", "EMP-003", "EMP-004"]);
        assert!(batch.records[0].is_late);
        assert_eq!(batch.records[0].late_by, Some(5));
        assert!(batch.records[1].employee.is_none());
        assert!(batch.records[2].check_in.is_none());
        assert!(batch.records[2].is_short_attendance);
        assert_eq!(batch.records[2].short_by_minutes, Some(20));
        let check_in = batch.records[3].check_in.as_ref().unwrap();
        assert!(check_in.time.is_some());
        assert_eq!(check_in.location, Location::default());
    }

    #[test]
    fn test_lenient_flags() {
        assert_eq!(raw(r#"{"isLate": "TRUE"}"#).is_late, Some(true));
        assert_eq!(raw(r#"{"isLate": 0}"#).is_late, Some(false));
        assert_eq!(raw(r#"{"isLate": "yes"}"#).is_late, None);
        assert_eq!(raw(r#"{"isShortAttendance": [true]}"#).is_short_attendance, None);
    }

    #[test]
    fn test_parse_payload_shapes() {
        let bare = parse_payload(r#"[{"date": "2024-03-01", "status": "absent"}]"#).unwrap();
        assert_eq!(bare.records.len(), 1);
        assert_eq!(bare.total_employees, None);

        let aliased = parse_payload(r#"{"data": []}"#).unwrap();
        assert!(aliased.records.is_empty());

        let not_a_list = parse_payload(r#"{"records": "none", "totalEmployees": 3}"#).unwrap();
        assert!(not_a_list.records.is_empty());
        assert_eq!(not_a_list.total_employees, Some(3));

        assert!(parse_payload("42").is_err());
        assert!(parse_payload("{").is_err());
    }
}
