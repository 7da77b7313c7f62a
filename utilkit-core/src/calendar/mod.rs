// ============================================================================
// utilkit-core/src/calendar/mod.rs
// ============================================================================
//
// CALENDAR: iCalendar to Spreadsheet Conversion
//
// Reads an .ics file, expands recurring events over a window around the
// current time, and writes one spreadsheet row per occurrence.
//
// KEY COMPONENTS:
// - parse: VEVENT reading and date/duration parsing
// - expand: EventWindow and recurrence expansion
// - spreadsheet: .xlsx writer
// - convert_calendar: End-to-end conversion
// - normalize_output_name / join_split_filenames: Command-line name handling
//
// AI-ASSISTANT-INFO: Calendar (.ics) to spreadsheet (.xlsx) conversion

mod expand;
mod parse;
mod spreadsheet;

pub use expand::{EventRecord, EventWindow, expand_events};
pub use parse::{CalendarEvent, parse_calendar, parse_duration, parse_ical_datetime};
pub use spreadsheet::{HEADERS, write_spreadsheet};

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Result of a calendar conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSummary {
    pub output: PathBuf,
    /// VEVENTs read from the file, before expansion.
    pub events_found: usize,
    /// Occurrences written to the spreadsheet.
    pub rows_written: usize,
}

/// Converts `input` into a spreadsheet at `output`.
pub fn convert_calendar(input: &Path, output: &Path, window: &EventWindow) -> CoreResult<CalendarSummary> {
    if !input.is_file() {
        return Err(CoreError::InputNotFound(format!(
            "calendar file {} does not exist",
            input.display()
        )));
    }

    let events = parse_calendar(input)?;
    let records = expand_events(&events, window);
    log::info!(
        "Expanded {} event(s) into {} occurrence(s) between {} and {}",
        events.len(),
        records.len(),
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_spreadsheet(&records, output)?;

    Ok(CalendarSummary {
        output: output.to_path_buf(),
        events_found: events.len(),
        rows_written: records.len(),
    })
}

/// Forces an `.xlsx` extension onto the requested output name.
pub fn normalize_output_name(name: &str) -> PathBuf {
    Path::new(name.trim()).with_extension("xlsx")
}

/// Rejoins file names that the shell split on spaces.
///
/// A fragment without a `.` is buffered and glued to the following fragment
/// with a single space until the joined name contains a `.`. A trailing
/// buffer is kept as its own name so a missing file can be reported.
pub fn join_split_filenames<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = String::new();

    for arg in args {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(arg.as_ref());
        if current.contains('.') {
            names.push(std::mem::take(&mut current));
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        names.push(rest.to_string());
    }
    names
}
