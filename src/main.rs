//! Attendance Calendar - reconcile attendance records into calendar reports.

use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use attendance_calendar as app;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use app::client::{AttendanceQuery, ProviderClient};
use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::engine::time_metrics::{format_clock, format_duration};
use app::engine::{FilterCriteria, StatusFilter};
use app::export::{export_calendar_to_excel, generate_export_filename};
use app::ingest::{AttendanceBatch, Ingestor, parse_payload};
use app::overview::DailyOverview;
use app::report::CalendarReport;

/// Reconcile attendance records into calendar reports.
#[derive(Parser)]
#[command(name = "attendance-calendar", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Config file path (overrides the platform default)
    #[arg(long, conflicts_with = "dev")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calendar, stats, and trend for one employee over a date range
    Report(ReportArgs),
    /// Attendance counts across all employees for one day
    Overview(OverviewArgs),
    /// Write a default config file
    InitConfig,
}

#[derive(Args)]
struct ReportArgs {
    /// Employee ID
    #[arg(long)]
    employee: String,

    /// First day (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,

    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,

    /// Read records from a JSON file instead of the provider
    #[arg(long)]
    input: Option<PathBuf>,

    /// Export to Excel; without a value a timestamped name is generated
    #[arg(long)]
    export: Option<Option<PathBuf>>,

    /// Only list days matching this text
    #[arg(long, default_value = "")]
    search: String,

    /// Only list days with this status ("all" for every status)
    #[arg(long, default_value = "all")]
    status: StatusFilter,

    /// Trend window in days (defaults to the configured window)
    #[arg(long)]
    window: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct OverviewArgs {
    /// Day to summarize (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// Read records from a JSON file instead of the provider
    #[arg(long)]
    input: Option<PathBuf>,

    /// Print the overview as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = if cli.dev {
        PathBuf::from("config.toml")
    } else {
        cli.config.clone().unwrap_or_else(AppConfig::default_path)
    };

    if matches!(cli.command, Command::InitConfig) {
        AppConfig::default()
            .save(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(());
    }

    let load_result = AppConfig::try_load(&config_path);
    let logging = match &load_result {
        ConfigLoadResult::Loaded(config) => config.logging.clone(),
        _ => LoggingConfig::default(),
    };
    let _guard = init_logging(&logging);

    tracing::info!("Attendance Calendar starting...");
    tracing::info!("Config path: {:?}", config_path);

    let config = match load_result {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            config
        }
        ConfigLoadResult::Missing => {
            tracing::info!("Config missing, using defaults");
            AppConfig::default()
        }
        ConfigLoadResult::Invalid(e) => {
            tracing::warn!("Config invalid: {}", e);
            return Err(anyhow::Error::new(e).context(format!("Invalid config at {}", config_path.display())));
        }
    };

    let ingestor = Ingestor::from_schedule(&config.schedule)?;

    match cli.command {
        Command::Report(args) => run_report(&config, &ingestor, args).await,
        Command::Overview(args) => run_overview(&config, &ingestor, args).await,
        Command::InitConfig => Ok(()),
    }
}

/// Initialize stderr logging, plus a daily log file when configured.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

/// Load a batch from a JSON file or the configured provider.
async fn load_batch(
    config: &AppConfig,
    ingestor: &Ingestor,
    input: Option<&Path>,
    query: &AttendanceQuery,
) -> anyhow::Result<AttendanceBatch> {
    match input {
        Some(path) => {
            tracing::info!("Reading records from {}", path.display());
            let body =
                std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let payload = parse_payload(&body).with_context(|| format!("Invalid records in {}", path.display()))?;
            Ok(ingestor.ingest(payload))
        }
        None => {
            let client = ProviderClient::new(&config.provider)?;
            let batch = client
                .fetch_batch(query, ingestor)
                .await
                .context("Failed to fetch attendance from provider")?;
            Ok(batch)
        }
    }
}

async fn run_report(config: &AppConfig, ingestor: &Ingestor, args: ReportArgs) -> anyhow::Result<()> {
    ensure!(args.from <= args.to, "--from {} is after --to {}", args.from, args.to);

    let query = AttendanceQuery::range(args.from, args.to)?.with_employee(args.employee.clone());
    let batch = load_batch(config, ingestor, args.input.as_deref(), &query).await?;

    let window = args.window.unwrap_or(config.report.trend_window);
    let report = CalendarReport::for_employee(&batch.records, &args.employee, args.from, args.to, window);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let criteria = FilterCriteria::new(args.search, args.status);
        print_report(&report, &criteria);
    }

    if let Some(target) = args.export {
        let path = target.unwrap_or_else(|| {
            let name = generate_export_filename(&format!("attendance_{}", args.employee));
            config.report.export_dir.clone().unwrap_or_default().join(name)
        });
        export_calendar_to_excel(&report, &path).with_context(|| format!("Failed to export {}", path.display()))?;
        tracing::info!("Exported report to {}", path.display());
        println!("Exported to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &CalendarReport, criteria: &FilterCriteria) {
    println!(
        "Attendance for {} ({} to {})",
        report.employee_id.as_deref().unwrap_or("-"),
        report.range_start,
        report.range_end
    );
    println!();
    println!(
        "{:<12} {:<4} {:<16} {:>9} {:>9} {:>8} {:>5}",
        "Date", "Day", "Status", "In", "Out", "Hours", "Late"
    );

    for day in report.filtered_days(criteria) {
        let record = day.record.as_ref();
        println!(
            "{:<12} {:<4} {:<16} {:>9} {:>9} {:>8} {:>5}",
            day.date.format("%Y-%m-%d").to_string(),
            day.date.format("%a").to_string(),
            day.status.label(),
            format_clock(record.and_then(|r| r.check_in_time())),
            format_clock(record.and_then(|r| r.check_out_time())),
            format_duration(day.work_hours()),
            record.map_or(0, |r| r.late_minutes()),
        );
    }

    let stats = &report.stats;
    println!();
    println!(
        "Present: {}  Absent: {}  Late: {}  On leave: {}  Non-working: {}",
        stats.present_days, stats.absent_days, stats.late_days, stats.on_leave_days, stats.non_working_days
    );
    println!(
        "Total: {}  Average: {}  Punctuality: {:.1}%",
        format_duration(stats.total_work_hours),
        format_duration(stats.average_work_hours),
        stats.punctuality_rate
    );

    let series = report.trend_series();
    if !series.is_empty() {
        println!("Trend: {} charted days ({} .. {})", series.len(), series.labels[0], series.labels[series.len() - 1]);
    }
}

async fn run_overview(config: &AppConfig, ingestor: &Ingestor, args: OverviewArgs) -> anyhow::Result<()> {
    let query = AttendanceQuery::day(args.date);
    let batch = load_batch(config, ingestor, args.input.as_deref(), &query).await?;
    let overview = DailyOverview::from_batch(&batch, args.date);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!("Attendance overview for {}", overview.date);
    println!("Employees:  {}", overview.total_employees);
    println!("Present:    {}", overview.present);
    println!("Absent:     {}", overview.absent);
    println!("Late:       {}", overview.late);
    println!("On leave:   {}", overview.on_leave);
    println!("Off duty:   {}", overview.off_duty);
    println!("Not marked: {}", overview.not_marked);
    println!("Rate:       {:.1}%", overview.attendance_rate);
    Ok(())
}
