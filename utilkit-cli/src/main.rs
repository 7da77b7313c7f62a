// ============================================================================
// utilkit-cli/src/main.rs
// ============================================================================
//
// UTILKIT CLI: Main Entry Point
//
// Parses the command line, sets up logging and dispatches to the selected
// subcommand. Any error is printed as an error block and the process exits
// with status 1.
//
// AI-ASSISTANT-INFO: Entry point for the utilkit binary

use clap::Parser;
use std::process;
use utilkit_cli::error::suggestion_for;
use utilkit_cli::logging::init_logging;
use utilkit_cli::{Cli, failure_title, run};
use utilkit_core::terminal;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e:#}");
        process::exit(1);
    }

    let title = failure_title(&cli.command);
    if let Err(e) = run(cli.command) {
        log::debug!("{e:?}");
        terminal::print_error(title, &e.to_string(), suggestion_for(&e));
        process::exit(1);
    }
}
