//! Excel export functionality.

use crate::engine::time_metrics::{format_clock, format_duration};
use crate::report::CalendarReport;
use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

/// Export a reconciled calendar with its summary to an Excel file.
/// Writes a "Calendar" sheet (one row per day) and a "Summary" sheet.
pub fn export_calendar_to_excel(report: &CalendarReport, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = calendar_workbook(report)?;
    workbook.save(path)?;
    Ok(())
}

fn calendar_workbook(report: &CalendarReport) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    write_calendar_sheet(workbook.add_worksheet(), report)?;
    write_summary_sheet(workbook.add_worksheet(), report)?;
    Ok(workbook)
}

/// Returns the number of day rows written below the header.
fn write_calendar_sheet(worksheet: &mut Worksheet, report: &CalendarReport) -> Result<u32, XlsxError> {
    worksheet.set_name("Calendar")?;

    let header_format = header_format();
    let hours_format = Format::new().set_num_format("0.00");

    let headers = [
        "Date",
        "Weekday",
        "Status",
        "Check In",
        "Check Out",
        "Duration",
        "Work Hours",
        "Late (min)",
        "Short (min)",
    ];

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    worksheet.set_column_width(0, 12)?; // Date
    worksheet.set_column_width(1, 11)?; // Weekday
    worksheet.set_column_width(2, 16)?; // Status
    worksheet.set_column_width(3, 10)?; // Check In
    worksheet.set_column_width(4, 10)?; // Check Out
    worksheet.set_column_width(5, 10)?; // Duration
    worksheet.set_column_width(6, 12)?; // Work Hours
    worksheet.set_column_width(7, 10)?; // Late
    worksheet.set_column_width(8, 11)?; // Short

    for (idx, day) in report.days.iter().enumerate() {
        let row = (idx + 1) as u32;
        let record = day.record.as_ref();

        worksheet.write_string(row, 0, day.date.format("%Y-%m-%d").to_string())?;
        worksheet.write_string(row, 1, day.date.format("%A").to_string())?;
        worksheet.write_string(row, 2, day.status.label())?;
        worksheet.write_string(row, 3, format_clock(record.and_then(|r| r.check_in_time())))?;
        worksheet.write_string(row, 4, format_clock(record.and_then(|r| r.check_out_time())))?;
        worksheet.write_string(row, 5, format_duration(day.work_hours()))?;
        worksheet.write_number_with_format(row, 6, day.work_hours(), &hours_format)?;
        worksheet.write_number(row, 7, record.map_or(0, |r| r.late_minutes()) as f64)?;

        // Short attendance is informational only
        let short_by = record
            .filter(|r| r.is_short_attendance)
            .and_then(|r| r.short_by_minutes)
            .unwrap_or(0);
        worksheet.write_number(row, 8, short_by as f64)?;
    }

    let last_row = report.days.len() as u32;
    if last_row > 0 {
        worksheet.autofilter(0, 0, last_row, 8)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(last_row)
}

fn write_summary_sheet(worksheet: &mut Worksheet, report: &CalendarReport) -> Result<(), XlsxError> {
    worksheet.set_name("Summary")?;

    let header_format = header_format();
    let rate_format = Format::new().set_num_format("0.0\"%\"");
    let hours_format = Format::new().set_num_format("0.00");

    worksheet.write_string_with_format(0, 0, "Metric", &header_format)?;
    worksheet.write_string_with_format(0, 1, "Value", &header_format)?;
    worksheet.set_column_width(0, 22)?;
    worksheet.set_column_width(1, 14)?;

    let stats = &report.stats;
    let employee = report.employee_id.as_deref().unwrap_or("");
    let range = format!("{} to {}", report.range_start, report.range_end);

    worksheet.write_string(1, 0, "Employee")?;
    worksheet.write_string(1, 1, employee)?;
    worksheet.write_string(2, 0, "Range")?;
    worksheet.write_string(2, 1, &range)?;

    let counts = [
        ("Total Days", stats.total_days),
        ("Present Days", stats.present_days),
        ("Half Days", stats.half_days),
        ("Absent Days", stats.absent_days),
        ("Late Days", stats.late_days),
        ("On Leave Days", stats.on_leave_days),
        ("Public Holidays", stats.public_holiday_days),
        ("Combo Off Days", stats.combo_off_days),
        ("Non-Working Days", stats.non_working_days),
    ];

    let mut row = 3u32;
    for (label, value) in counts {
        worksheet.write_string(row, 0, label)?;
        worksheet.write_number(row, 1, value as f64)?;
        row += 1;
    }

    worksheet.write_string(row, 0, "Total Work Hours")?;
    worksheet.write_number_with_format(row, 1, stats.total_work_hours, &hours_format)?;
    row += 1;
    worksheet.write_string(row, 0, "Average Work Hours")?;
    worksheet.write_number_with_format(row, 1, stats.average_work_hours, &hours_format)?;
    row += 1;
    worksheet.write_string(row, 0, "Punctuality")?;
    worksheet.write_number_with_format(row, 1, stats.punctuality_rate, &rate_format)?;

    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}
