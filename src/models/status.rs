//! Attendance status taxonomy.
//!
//! The wire strings are consumed verbatim by the presentation layer for
//! per-status styling, so renaming any of them is a breaking change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Semantic status of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    OnLeave,
    HalfDay,
    PublicHoliday,
    ComboOff,
    /// No record exists for the day. Never counted as an absence.
    NonWorkingDay,
}

impl AttendanceStatus {
    /// Every status, in display order.
    pub const ALL: [AttendanceStatus; 7] = [
        Self::Present,
        Self::Absent,
        Self::OnLeave,
        Self::HalfDay,
        Self::PublicHoliday,
        Self::ComboOff,
        Self::NonWorkingDay,
    ];

    /// Stable wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::OnLeave => "on-leave",
            Self::HalfDay => "half-day",
            Self::PublicHoliday => "public-holiday",
            Self::ComboOff => "combo-off",
            Self::NonWorkingDay => "non-working-day",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::OnLeave => "On Leave",
            Self::HalfDay => "Half Day",
            Self::PublicHoliday => "Public Holiday",
            Self::ComboOff => "Combo Off",
            Self::NonWorkingDay => "Non-Working Day",
        }
    }

    /// Icon name rendered next to the label (Phosphor icon set).
    pub fn icon(self) -> &'static str {
        match self {
            Self::Present => "check-circle",
            Self::Absent => "x-circle",
            Self::OnLeave => "airplane-tilt",
            Self::HalfDay => "circle-half",
            Self::PublicHoliday => "flag",
            Self::ComboOff => "swap",
            Self::NonWorkingDay => "minus-circle",
        }
    }

    /// Present and half-day both count toward present days.
    pub fn counts_as_present(self) -> bool {
        matches!(self, Self::Present | Self::HalfDay)
    }

    /// Statuses that may carry check-in/out events and work hours.
    pub fn is_working_status(self) -> bool {
        matches!(self, Self::Present | Self::HalfDay)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| AppError::parse(format!("Unknown attendance status '{s}'")))
    }
}
