// utilkit-cli/src/commands/convert.rs
//
// The `convert` subcommand. Values missing from the command line are asked
// for on stdin.

use crate::cli::ConvertArgs;
use crate::error::CliResult;
use std::io;
use utilkit_core::config::EncoderSettings;
use utilkit_core::convert::{convert_video, prompt_conversion_request, resolve_input};
use utilkit_core::external::{SidecarSpawner, check_ffmpeg_installed};
use utilkit_core::terminal;

pub fn run_convert(args: ConvertArgs) -> CliResult<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    let request = prompt_conversion_request(
        &mut reader,
        &mut writer,
        args.input.as_deref(),
        args.format.as_deref(),
        args.output.as_deref(),
    )?;
    log::debug!("Conversion request: {request:?}");

    resolve_input(&request.input)?;
    check_ffmpeg_installed()?;

    let encoder = EncoderSettings::from_env();
    encoder.validate()?;

    let output = convert_video(&SidecarSpawner, &request, &encoder)?;
    terminal::print_success(&format!("Converted video saved at: {}", output.display()));
    Ok(())
}
