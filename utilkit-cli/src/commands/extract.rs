// utilkit-cli/src/commands/extract.rs
//
// The `extract-contacts` subcommand.

use crate::cli::ExtractArgs;
use crate::error::CliResult;
use utilkit_core::contacts::{ExtractOptions, PdfExtractor, extract_contacts};
use utilkit_core::terminal;

pub fn run_extract(args: ExtractArgs) -> CliResult<()> {
    let options = ExtractOptions {
        keep_input: args.keep_input || ExtractOptions::from_env().keep_input,
    };

    terminal::print_section("Contact extraction");
    let summary = extract_contacts(&PdfExtractor, &args.input_dir, &args.output_dir, &options)?;

    terminal::print_status("Groups", &summary.groups.to_string(), false);
    terminal::print_status("Files processed", &summary.files_processed.to_string(), false);
    terminal::print_status("Files failed", &summary.files_failed.to_string(), false);
    if !options.keep_input {
        terminal::print_status("Entries deleted", &summary.deleted_entries.to_string(), false);
    }
    terminal::print_success("Action was successful");
    Ok(())
}
