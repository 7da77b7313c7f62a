// utilkit-cli/src/commands/calendar.rs
//
// The `calendar` subcommand: .ics to .xlsx.

use crate::cli::CalendarArgs;
use crate::error::{CliErrorContext, CliResult};
use std::path::{Path, PathBuf};
use utilkit_core::calendar::{EventWindow, convert_calendar, join_split_filenames, normalize_output_name};
use utilkit_core::config::DEFAULT_SPREADSHEET_NAME;
use utilkit_core::terminal;

/// Works out the input and output paths from the raw positional arguments.
pub fn resolve_paths(raw: &[String]) -> CliResult<(PathBuf, PathBuf)> {
    let names = join_split_filenames(raw);
    let mut names = names.into_iter();

    let input = names
        .next()
        .cli_context("Please provide an .ics path and optionally an output name (defaults to output.xlsx)")?;
    let output = names
        .next()
        .map(|name| normalize_output_name(&name))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SPREADSHEET_NAME));

    let ignored: Vec<String> = names.collect();
    if !ignored.is_empty() {
        log::warn!("Ignoring extra arguments: {}", ignored.join(", "));
    }

    Ok((PathBuf::from(input), output))
}

pub fn run_calendar(args: CalendarArgs) -> CliResult<()> {
    let (input, output) = resolve_paths(&args.names)?;

    terminal::print_section("Calendar conversion");
    terminal::print_status("Input", &input.display().to_string(), false);
    terminal::print_status("Output", &output.display().to_string(), false);

    let window = EventWindow::from_now();
    let summary = convert_calendar(Path::new(&input), &output, &window)
        .cli_with_context(|| format!("Converting {}", input.display()))?;

    terminal::print_status("Events", &summary.events_found.to_string(), false);
    terminal::print_status("Rows written", &summary.rows_written.to_string(), true);
    terminal::print_success(&format!(
        "Your file was successfully converted -> {}",
        summary.output.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_output_name() {
        let (input, output) = resolve_paths(&strings(&["team.ics"])).unwrap();
        assert_eq!(input, PathBuf::from("team.ics"));
        assert_eq!(output, PathBuf::from("output.xlsx"));
    }

    #[test]
    fn test_split_names_and_extension_swap() {
        let (input, output) = resolve_paths(&strings(&["My", "Team.ics", "summary.csv"])).unwrap();
        assert_eq!(input, PathBuf::from("My Team.ics"));
        assert_eq!(output, PathBuf::from("summary.xlsx"));

        let (_, bare) = resolve_paths(&strings(&["a.ics", "report"])).unwrap();
        assert_eq!(bare, PathBuf::from("report.xlsx"));
    }
}
