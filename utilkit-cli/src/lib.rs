// utilkit-cli/src/lib.rs
//
// Library portion of the utilkit CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands};
pub use error::{CliErrorContext, CliResult};

/// Runs the parsed subcommand.
pub fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Calendar(args) => commands::calendar::run_calendar(args),
        Commands::Compress(args) => commands::compress::run_compress(args),
        Commands::Analyze(args) => commands::compress::run_analyze(args),
        Commands::ExtractContacts(args) => commands::extract::run_extract(args),
        Commands::Convert(args) => commands::convert::run_convert(args),
        Commands::Zip(args) => commands::zip::run_zip(args),
    }
}

/// Title of the error block printed when `command` fails.
pub fn failure_title(command: &Commands) -> &'static str {
    match command {
        Commands::Calendar(_) => "Calendar conversion failed",
        Commands::Compress(_) => "Compression failed",
        Commands::Analyze(_) => "Analysis failed",
        Commands::ExtractContacts(_) => "Contact extraction failed",
        Commands::Convert(_) => "Conversion failed",
        Commands::Zip(_) => "Zipping failed",
    }
}
