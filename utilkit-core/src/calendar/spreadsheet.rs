//! Spreadsheet output for expanded calendar events.

use super::expand::EventRecord;
use crate::error::CoreResult;
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::path::Path;

/// Column headers, in order.
pub const HEADERS: [&str; 5] = ["Summary", "Start", "End", "Description", "Location"];

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Writes one header row plus one row per record to `path`.
///
/// Start and End are stored as real date-time cells; missing text fields
/// leave their cells empty.
pub fn write_spreadsheet(records: &[EventRecord], path: &Path) -> CoreResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        write_optional(worksheet, row, 0, record.summary.as_deref())?;
        worksheet.write_datetime_with_format(row, 1, &to_excel(record.start)?, &datetime_format)?;
        worksheet.write_datetime_with_format(row, 2, &to_excel(record.end)?, &datetime_format)?;
        write_optional(worksheet, row, 3, record.description.as_deref())?;
        write_optional(worksheet, row, 4, record.location.as_deref())?;
    }

    worksheet.set_column_width(0, 32)?;
    worksheet.set_column_width(1, 20)?;
    worksheet.set_column_width(2, 20)?;
    worksheet.set_column_width(3, 48)?;
    worksheet.set_column_width(4, 24)?;

    workbook.save(path)?;
    log::debug!("Wrote {} row(s) to {}", records.len(), path.display());
    Ok(())
}

fn write_optional(worksheet: &mut Worksheet, row: u32, col: u16, value: Option<&str>) -> CoreResult<()> {
    if let Some(text) = value.filter(|t| !t.is_empty()) {
        worksheet.write_string(row, col, text)?;
    }
    Ok(())
}

fn to_excel(value: NaiveDateTime) -> CoreResult<ExcelDateTime> {
    let datetime = ExcelDateTime::from_ymd(value.year() as u16, value.month() as u8, value.day() as u8)?
        .and_hms(value.hour() as u16, value.minute() as u8, f64::from(value.second()))?;
    Ok(datetime)
}
