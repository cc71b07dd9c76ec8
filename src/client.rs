//! Attendance data-provider HTTP client.

use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::ingest::{AttendanceBatch, Ingestor, RawAttendancePayload, parse_payload};
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Longest error body kept in a provider error message.
const MAX_ERROR_BODY: usize = 200;

/// Dates covered by a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelector {
    Day(NaiveDate),
    Range { from: NaiveDate, to: NaiveDate },
}

/// One provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceQuery {
    pub dates: DateSelector,
    pub employee_id: Option<String>,
}

impl AttendanceQuery {
    /// All employees for a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            dates: DateSelector::Day(date),
            employee_id: None,
        }
    }

    /// A closed date range; `from` must not be after `to`.
    pub fn range(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(AppError::validation(format!("Range start {from} is after end {to}")));
        }
        Ok(Self {
            dates: DateSelector::Range { from, to },
            employee_id: None,
        })
    }

    /// Restrict to one employee.
    pub fn with_employee(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = match self.dates {
            DateSelector::Day(date) => vec![("date", date.format("%Y-%m-%d").to_string())],
            DateSelector::Range { from, to } => vec![
                ("from", from.format("%Y-%m-%d").to_string()),
                ("to", to.format("%Y-%m-%d").to_string()),
            ],
        };
        if let Some(id) = &self.employee_id {
            params.push(("employeeId", id.clone()));
        }
        params
    }
}

/// Attendance provider client.
///
/// Issues one request per call; retries and overlapping-request handling are
/// left to the caller.
pub struct ProviderClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl ProviderClient {
    /// Create a new client from provider settings.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(AppError::config("Provider base URL is not configured"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Endpoint serving attendance records.
    pub fn attendance_url(&self) -> String {
        format!("{base}/attendance", base = self.base_url)
    }

    /// Fetch the raw provider payload.
    pub async fn fetch(&self, query: &AttendanceQuery) -> Result<RawAttendancePayload> {
        let url = self.attendance_url();
        let params = query.query_params();
        info!("Fetching attendance from {url} {params:?}");

        let mut request = self.client.get(&url).query(&params);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::provider(status.as_u16(), truncate(&body, MAX_ERROR_BODY)));
        }

        debug!("Provider returned {} bytes", body.len());
        parse_payload(&body)
    }

    /// Fetch and normalize in one step.
    pub async fn fetch_batch(&self, query: &AttendanceQuery, ingestor: &Ingestor) -> Result<AttendanceBatch> {
        let payload = self.fetch(query).await?;
        Ok(ingestor.ingest(payload))
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
