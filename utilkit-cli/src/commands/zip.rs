// utilkit-cli/src/commands/zip.rs
//
// The `zip` subcommand.

use crate::cli::ZipArgs;
use crate::error::CliResult;
use utilkit_core::archive::zip_directory;
use utilkit_core::terminal;
use utilkit_core::utils::format_bytes;

pub fn run_zip(args: ZipArgs) -> CliResult<()> {
    let summary = zip_directory(&args.source, &args.destination)?;

    log::debug!(
        "Stored {} file(s), {} uncompressed",
        summary.files_added,
        format_bytes(summary.bytes_in)
    );
    terminal::print_success(&format!(
        "Directory '{}' zipped successfully to '{}'.",
        args.source.display(),
        summary.destination.display()
    ));
    Ok(())
}
