//! Free-text and status filtering over records and reconciled days.

use std::str::FromStr;

use crate::error::AppError;
use crate::models::{AttendanceRecord, AttendanceStatus, ReconciledDay};

/// Anything that can be searched by employee identity and filtered by status.
pub trait Searchable {
    /// Employee name, ID, and department, where known.
    fn search_fields(&self) -> [Option<&str>; 3];

    fn status(&self) -> AttendanceStatus;
}

impl Searchable for AttendanceRecord {
    fn search_fields(&self) -> [Option<&str>; 3] {
        let employee = self.employee.as_ref();
        [
            employee.map(|e| e.name.as_str()),
            Some(self.employee_id.as_str()),
            employee.and_then(|e| e.department.as_deref()),
        ]
    }

    fn status(&self) -> AttendanceStatus {
        self.status
    }
}

impl Searchable for ReconciledDay {
    fn search_fields(&self) -> [Option<&str>; 3] {
        self.record.as_ref().map_or([None; 3], |record| record.search_fields())
    }

    fn status(&self) -> AttendanceStatus {
        self.status
    }
}

/// Status predicate; `all` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AttendanceStatus),
}

impl StatusFilter {
    pub fn matches(self, status: AttendanceStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Search term plus status filter, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub status_filter: StatusFilter,
}

impl FilterCriteria {
    pub fn new(search_term: impl Into<String>, status_filter: StatusFilter) -> Self {
        Self {
            search_term: search_term.into(),
            status_filter,
        }
    }

    pub fn matches<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        self.status_filter.matches(item.status()) && self.matches_text(item)
    }

    fn matches_text<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        let term = self.search_term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        item.search_fields()
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Items matching `criteria`, in input order. The input is left untouched.
pub fn filter<T: Searchable + Clone>(items: &[T], criteria: &FilterCriteria) -> Vec<T> {
    items.iter().filter(|item| criteria.matches(*item)).cloned().collect()
}
