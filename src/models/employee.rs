//! Employee identity attached to attendance records.

use serde::{Deserialize, Serialize};

/// Identity fields used for display and free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInfo {
    pub employee_id: String,
    pub name: String,
    pub department: Option<String>,
}
