// ============================================================================
// utilkit-cli/src/commands/compress.rs
// ============================================================================
//
// COMPRESS / ANALYZE COMMANDS: Size-targeted Compression and Video Analysis
//
// Builds CompressOptions from the arguments and the UTILKIT_* encoder
// overrides, then hands off to utilkit-core with the production ffmpeg and
// ffprobe executors.
//
// AI-ASSISTANT-INFO: CLI glue for compress_video_to_size and analyze_video

use crate::cli::{AnalyzeArgs, CompressArgs};
use crate::error::CliResult;
use std::path::Path;
use utilkit_core::compress::{
    CompressOptions, CompressOutcome, analyze_video, compress_video_to_size, get_video_info,
};
use utilkit_core::config::EncoderSettings;
use utilkit_core::external::{CrateFfprobeExecutor, SidecarSpawner, StdFsMetadataProvider};
use utilkit_core::{CoreError, terminal};

/// Turns the parsed arguments into core options.
pub fn compress_options(args: &CompressArgs, encoder: EncoderSettings) -> CompressOptions {
    CompressOptions {
        output: args.output.clone(),
        target_size_gb: args.size,
        downscale_1080p: args.downscale,
        use_hevc: args.hevc,
        reduce_fps: args.fps30,
        encoder,
    }
}

fn ensure_input(input: &Path) -> CliResult<()> {
    if input.exists() {
        Ok(())
    } else {
        Err(CoreError::InputNotFound(format!(
            "Input file does not exist: {}",
            input.display()
        )))
    }
}

pub fn run_compress(args: CompressArgs) -> CliResult<()> {
    if args.analyze {
        return run_analyze(AnalyzeArgs {
            input: args.input,
            json: false,
        });
    }

    let encoder = EncoderSettings::from_env();
    let options = compress_options(&args, encoder);
    options.validate()?;
    log::debug!("Compression options: {options:?}");

    let outcome = compress_video_to_size(
        &SidecarSpawner,
        &CrateFfprobeExecutor::new(),
        &StdFsMetadataProvider,
        &args.input,
        &options,
    )?;

    match outcome {
        CompressOutcome::AlreadyUnderTarget { path, .. } => {
            log::debug!("Left {} untouched", path.display());
        }
        CompressOutcome::Compressed { output, met_target, .. } => {
            log::debug!("Wrote {} (target met: {met_target})", output.display());
        }
    }
    Ok(())
}

pub fn run_analyze(args: AnalyzeArgs) -> CliResult<()> {
    ensure_input(&args.input)?;
    let prober = CrateFfprobeExecutor::new();

    if args.json {
        let info = get_video_info(&prober, &StdFsMetadataProvider, &args.input)?;
        let json = serde_json::to_string_pretty(&info).map_err(|e| {
            CoreError::OperationFailed(format!("could not serialize video information: {e}"))
        })?;
        println!("{json}");
        return Ok(());
    }

    analyze_video(&prober, &StdFsMetadataProvider, &args.input)?;
    terminal::print_success("Analysis complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_compress_options_from_args() {
        let args = CompressArgs {
            input: PathBuf::from("in.mov"),
            output: Some(PathBuf::from("out.mp4")),
            size: 0.5,
            analyze: false,
            downscale: true,
            hevc: false,
            fps30: true,
        };
        let options = compress_options(&args, EncoderSettings::default());
        assert_eq!(options.output, Some(PathBuf::from("out.mp4")));
        assert_eq!(options.target_size_gb, 0.5);
        assert!(options.downscale_1080p && options.reduce_fps && !options.use_hevc);
    }

    #[test]
    fn test_analyze_missing_input() {
        let err = run_analyze(AnalyzeArgs {
            input: PathBuf::from("/no/such/video.mp4"),
            json: true,
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::InputNotFound(_)));
    }
}
