//! Configuration management module.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::time_metrics::LatenessPolicy;
use crate::engine::trend::DEFAULT_TREND_WINDOW;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub schedule: ScheduleConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Attendance data-provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL, empty when only file input is used.
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
    /// Bearer token forwarded as-is.
    pub api_token: Option<String>,
}

/// Working schedule used to derive lateness and short attendance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Scheduled start, `HH:MM`.
    pub work_start: String,
    pub grace_minutes: i64,
    pub required_hours: f64,
}

/// Report defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub trend_window: usize,
    /// Directory for generated exports (default: current directory).
    pub export_dir: Option<PathBuf>,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a daily-rolling log file here in addition to stderr.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl AppConfig {
    /// Get config file path in the platform config directory.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "Gianged", "AttendanceCalendar")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.provider.base_url.is_empty() && !self.provider.base_url.starts_with("http") {
            return Err(ConfigError::Validation(
                "Provider URL must start with http:// or https://".to_string(),
            ));
        }
        if self.provider.timeout_secs < 5 {
            return Err(ConfigError::Validation(
                "Provider timeout must be at least 5 seconds".to_string(),
            ));
        }
        self.schedule.lateness_policy()?;
        if !(0..=240).contains(&self.schedule.grace_minutes) {
            return Err(ConfigError::Validation(
                "Grace period must be between 0 and 240 minutes".to_string(),
            ));
        }
        if !(self.schedule.required_hours > 0.0 && self.schedule.required_hours <= 24.0) {
            return Err(ConfigError::Validation(
                "Required hours must be greater than 0 and at most 24".to_string(),
            ));
        }
        if self.report.trend_window < 1 {
            return Err(ConfigError::Validation("Trend window must be at least 1 day".to_string()));
        }
        if self.report.trend_window > 366 {
            return Err(ConfigError::Validation("Trend window cannot exceed 366 days".to_string()));
        }
        if self.logging.file_prefix.trim().is_empty() {
            return Err(ConfigError::Validation("Log file prefix cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ScheduleConfig {
    /// Parse `work_start` into a lateness policy.
    pub fn lateness_policy(&self) -> Result<LatenessPolicy, ConfigError> {
        let start = NaiveTime::parse_from_str(self.work_start.trim(), "%H:%M").map_err(|e| {
            ConfigError::Validation(format!("Invalid work start '{}': {e}", self.work_start))
        })?;
        Ok(LatenessPolicy::new(start, self.grace_minutes))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
            api_token: None,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            work_start: "09:00".to_string(),
            grace_minutes: 0,
            required_hours: 8.0,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            export_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "attendance-calendar.log".to_string(),
        }
    }
}
