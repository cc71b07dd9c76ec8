//! Data models for attendance records, reconciled days, and employees.

pub mod attendance;
pub mod employee;
pub mod status;

pub use attendance::{AttendanceRecord, CheckIn, CheckOut, Location, ReconciledDay};
pub use employee::EmployeeInfo;
pub use status::AttendanceStatus;
