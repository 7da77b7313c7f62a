// ============================================================================
// utilkit-core/src/compress/mod.rs
// ============================================================================
//
// COMPRESS: Size-Targeted Video Compression
//
// This module re-encodes a video so that it lands near a requested file size.
// The target bitrate is a closed-form estimate from the duration and the size
// budget; ffmpeg runs once and the final size is only reported afterwards.
//
// KEY COMPONENTS:
// - CompressOptions: user choices (target size, 1080p, HEVC, 30 fps)
// - CompressionPlan: derived bitrate, codec and filters
// - compression_args: the ffmpeg argument list for a plan
// - compress_video_to_size: analysis, plan, encode and report
//
// AI-ASSISTANT-INFO: Size-targeted video compression on top of ffmpeg

mod info;

pub use info::{
    AudioStreamInfo, VideoInfo, VideoStreamInfo, analyze_video, calculate_target_bitrate,
    get_video_info, print_video_details, recommendations,
};

use crate::config::{
    CAPPED_FRAME_RATE, DEFAULT_TARGET_SIZE_GB, EncoderSettings, H264_ENCODER, HEVC_BITRATE_FACTOR,
    HEVC_ENCODER, MAX_1080P_BITRATE_KBPS, SCALE_1080P_FILTER,
};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FileMetadataProvider, VideoProber, run_ffmpeg};
use crate::terminal;
use crate::utils::{bytes_to_gb, format_bytes};
use std::path::{Path, PathBuf};

/// User choices for a compression run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressOptions {
    /// Explicit output path; defaults to a suffixed name next to the input.
    pub output: Option<PathBuf>,
    pub target_size_gb: f64,
    pub downscale_1080p: bool,
    pub use_hevc: bool,
    pub reduce_fps: bool,
    pub encoder: EncoderSettings,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            output: None,
            target_size_gb: DEFAULT_TARGET_SIZE_GB,
            downscale_1080p: false,
            use_hevc: false,
            reduce_fps: false,
            encoder: EncoderSettings::default(),
        }
    }
}

impl CompressOptions {
    pub fn validate(&self) -> CoreResult<()> {
        if !self.target_size_gb.is_finite() || self.target_size_gb <= 0.0 {
            return Err(CoreError::Config(format!(
                "target size must be a positive number of GB, got {}",
                self.target_size_gb
            )));
        }
        self.encoder.validate()
    }
}

/// Encoder settings derived from the options and the video's duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionPlan {
    pub target_bitrate_kbps: u64,
    pub video_codec: &'static str,
    pub scale_filter: Option<&'static str>,
    pub frame_rate: Option<u32>,
}

/// `<stem>_compressed[_1080p][_h265][_30fps].mp4` next to the input.
pub fn default_output_path(input: &Path, options: &CompressOptions) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name = format!("{stem}_compressed");
    if options.downscale_1080p {
        name.push_str("_1080p");
    }
    if options.use_hevc {
        name.push_str("_h265");
    }
    if options.reduce_fps {
        name.push_str("_30fps");
    }
    name.push_str(".mp4");

    input.with_file_name(name)
}

/// Derives the bitrate (kbps), codec and filters for a video of `duration_secs`.
///
/// The 1080p ceiling is applied before the HEVC reduction.
pub fn plan_compression(duration_secs: f64, options: &CompressOptions) -> CoreResult<CompressionPlan> {
    let mut kbps = calculate_target_bitrate(duration_secs, options.target_size_gb)? / 1000;

    if options.downscale_1080p {
        kbps = kbps.min(MAX_1080P_BITRATE_KBPS);
    }
    if options.use_hevc {
        kbps = (kbps as f64 * HEVC_BITRATE_FACTOR) as u64;
    }

    Ok(CompressionPlan {
        target_bitrate_kbps: kbps,
        video_codec: if options.use_hevc { HEVC_ENCODER } else { H264_ENCODER },
        scale_filter: options.downscale_1080p.then_some(SCALE_1080P_FILTER),
        frame_rate: options.reduce_fps.then_some(CAPPED_FRAME_RATE),
    })
}

/// Builds the ffmpeg argument list for a plan.
pub fn compression_args(
    input: &Path,
    output: &Path,
    plan: &CompressionPlan,
    encoder: &EncoderSettings,
) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        plan.video_codec.to_string(),
        "-b:v".to_string(),
        format!("{}k", plan.target_bitrate_kbps),
        "-preset".to_string(),
        encoder.preset.clone(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        encoder.compress_audio_bitrate.clone(),
    ];

    if let Some(filter) = plan.scale_filter {
        args.push("-vf".to_string());
        args.push(filter.to_string());
    }
    if let Some(fps) = plan.frame_rate {
        args.push("-r".to_string());
        args.push(fps.to_string());
    }

    args.push("-y".to_string());
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Result of a compression run.
#[derive(Debug, Clone, PartialEq)]
pub enum CompressOutcome {
    /// The input already fits the target; nothing was encoded.
    AlreadyUnderTarget { path: PathBuf, size: u64 },
    /// ffmpeg produced `output`; `met_target` says whether it fits.
    Compressed {
        output: PathBuf,
        final_size: u64,
        met_target: bool,
    },
}

impl CompressOutcome {
    /// The file the user should keep.
    pub fn path(&self) -> &Path {
        match self {
            CompressOutcome::AlreadyUnderTarget { path, .. } => path,
            CompressOutcome::Compressed { output, .. } => output,
        }
    }
}

/// Compresses `input` towards `options.target_size_gb`.
///
/// Prints the analysis report first. Returns early without encoding when the
/// input is already within the target.
pub fn compress_video_to_size<S, P, M>(
    spawner: &S,
    prober: &P,
    metadata: &M,
    input: &Path,
    options: &CompressOptions,
) -> CoreResult<CompressOutcome>
where
    S: FfmpegSpawner,
    P: VideoProber,
    M: FileMetadataProvider,
{
    if !input.exists() {
        return Err(CoreError::InputNotFound(format!(
            "Input file does not exist: {}",
            input.display()
        )));
    }
    options.validate()?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, options));
    if output == input {
        return Err(CoreError::PathError(format!(
            "Output path must differ from the input: {}",
            output.display()
        )));
    }

    let info = get_video_info(prober, metadata, input)?;
    print_video_details(&info);

    terminal::print_processing("Compression");
    terminal::print_status("Target size", &format!("{} GB", options.target_size_gb), true);

    if info.size_gb() <= options.target_size_gb {
        terminal::print_success(&format!(
            "File is already under {} GB. No compression needed.",
            options.target_size_gb
        ));
        return Ok(CompressOutcome::AlreadyUnderTarget {
            path: input.to_path_buf(),
            size: info.file_size,
        });
    }

    let plan = plan_compression(info.duration, options)?;
    if options.downscale_1080p {
        terminal::print_sub_item(&format!(
            "Downscaling to 1080p - bitrate capped at {MAX_1080P_BITRATE_KBPS} kbps"
        ));
    }
    if options.use_hevc {
        terminal::print_sub_item("Using H.265 codec - bitrate reduced by 30%");
    }
    terminal::print_status("Bitrate", &format!("{} kbps", plan.target_bitrate_kbps), true);
    terminal::print_status("Output", &output.display().to_string(), false);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let args = compression_args(input, &output, &plan, &options.encoder);
    run_ffmpeg(spawner, &args, "Compressing", Some(info.duration))?;

    let final_size = metadata.get_size(&output)?;
    let met_target = bytes_to_gb(final_size) <= options.target_size_gb;

    terminal::print_success(&format!("Video compressed and saved to: {}", output.display()));
    terminal::print_status(
        "Final size",
        &format!("{:.2} GB ({})", bytes_to_gb(final_size), format_bytes(final_size)),
        true,
    );
    if met_target {
        terminal::print_status("Target", "met", false);
    } else {
        terminal::print_status("Target", "missed", false);
        terminal::print_warning("File is slightly larger than target, but close enough.");
    }

    Ok(CompressOutcome::Compressed {
        output,
        final_size,
        met_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_flags() -> CompressOptions {
        CompressOptions {
            downscale_1080p: true,
            use_hevc: true,
            reduce_fps: true,
            ..CompressOptions::default()
        }
    }

    #[test]
    fn test_default_output_path_suffixes() {
        assert_eq!(
            default_output_path(Path::new("movie.mov"), &all_flags()),
            PathBuf::from("movie_compressed_1080p_h265_30fps.mp4")
        );
        assert_eq!(
            default_output_path(Path::new("/videos/clip.mkv"), &CompressOptions::default()),
            PathBuf::from("/videos/clip_compressed.mp4")
        );
        let hevc_only = CompressOptions {
            use_hevc: true,
            ..CompressOptions::default()
        };
        assert_eq!(
            default_output_path(Path::new("a.b.mp4"), &hevc_only),
            PathBuf::from("a.b_compressed_h265.mp4")
        );
    }

    #[test]
    fn test_plan_plain() {
        let plan = plan_compression(3600.0, &CompressOptions::default()).unwrap();
        assert_eq!(plan.target_bitrate_kbps, 2147);
        assert_eq!(plan.video_codec, "libx264");
        assert_eq!(plan.scale_filter, None);
        assert_eq!(plan.frame_rate, None);
    }

    #[test]
    fn test_plan_caps_then_reduces() {
        // 60 s at 1 GB is ~128 Mbps, well above the 1080p ceiling.
        let plan = plan_compression(60.0, &all_flags()).unwrap();
        assert_eq!(plan.target_bitrate_kbps, 8400);
        assert_eq!(plan.video_codec, "libx265");
        assert_eq!(plan.scale_filter, Some("scale=1920:1080"));
        assert_eq!(plan.frame_rate, Some(30));
    }

    #[test]
    fn test_plan_cap_leaves_low_bitrates_alone() {
        let options = CompressOptions {
            downscale_1080p: true,
            ..CompressOptions::default()
        };
        assert_eq!(plan_compression(3600.0, &options).unwrap().target_bitrate_kbps, 2147);
    }

    #[test]
    fn test_compression_args() {
        let plan = plan_compression(60.0, &all_flags()).unwrap();
        let args = compression_args(
            Path::new("in.mov"),
            Path::new("out.mp4"),
            &plan,
            &EncoderSettings::default(),
        );
        let expected: Vec<String> = [
            "-i", "in.mov", "-c:v", "libx265", "-b:v", "8400k", "-preset", "medium", "-c:a",
            "aac", "-b:a", "128k", "-vf", "scale=1920:1080", "-r", "30", "-y", "out.mp4",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_validate_rejects_non_positive_size() {
        let options = CompressOptions {
            target_size_gb: 0.0,
            ..CompressOptions::default()
        };
        assert!(matches!(options.validate(), Err(CoreError::Config(_))));
        let options = CompressOptions {
            target_size_gb: f64::INFINITY,
            ..CompressOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[cfg(unix)]
    mod flow {
        use super::*;
        use crate::compress::info::tests::probe_fixture;
        use crate::external::mocks::MockFfmpegSpawner;
        use ffprobe::FfProbe;
        use std::cell::RefCell;
        use std::collections::HashMap;

        struct FixtureProber {
            duration: &'static str,
            width: i64,
            height: i64,
            fps: &'static str,
        }

        impl VideoProber for FixtureProber {
            fn probe(&self, _input_path: &Path) -> CoreResult<FfProbe> {
                Ok(probe_fixture(self.duration, self.width, self.height, self.fps))
            }
        }

        fn prober(duration: &'static str, width: i64, height: i64, fps: &'static str) -> FixtureProber {
            FixtureProber {
                duration,
                width,
                height,
                fps,
            }
        }

        /// Reports fixed sizes for known paths and real sizes otherwise.
        #[derive(Default)]
        struct FakeSizes(RefCell<HashMap<PathBuf, u64>>);

        impl FileMetadataProvider for FakeSizes {
            fn get_size(&self, path: &Path) -> CoreResult<u64> {
                match self.0.borrow().get(path) {
                    Some(size) => Ok(*size),
                    None => Ok(std::fs::metadata(path)?.len()),
                }
            }
        }

        const GB: u64 = 1024 * 1024 * 1024;

        fn setup(input_size: u64) -> (tempfile::TempDir, PathBuf, FakeSizes) {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("movie.mov");
            std::fs::write(&input, b"not really a video").unwrap();
            let sizes = FakeSizes::default();
            sizes.0.borrow_mut().insert(input.clone(), input_size);
            (dir, input, sizes)
        }

        #[test]
        fn test_small_file_is_returned_unchanged() {
            let (_dir, input, sizes) = setup(GB / 2);
            let spawner = MockFfmpegSpawner::new();
            let prober = prober("3600.0", 1920, 1080, "30/1");

            let outcome =
                compress_video_to_size(&spawner, &prober, &sizes, &input, &CompressOptions::default())
                    .unwrap();

            assert_eq!(
                outcome,
                CompressOutcome::AlreadyUnderTarget {
                    path: input.clone(),
                    size: GB / 2
                }
            );
            assert!(spawner.received_calls().is_empty());
        }

        #[test]
        fn test_large_file_is_encoded_with_planned_bitrate() {
            let (dir, input, sizes) = setup(3 * GB);
            let spawner = MockFfmpegSpawner::new();
            spawner.push_success_with_output(4096);
            let prober = prober("3600.0", 3840, 2160, "60/1");

            let outcome =
                compress_video_to_size(&spawner, &prober, &sizes, &input, &all_flags()).unwrap();

            let expected_output = dir.path().join("movie_compressed_1080p_h265_30fps.mp4");
            assert_eq!(
                outcome,
                CompressOutcome::Compressed {
                    output: expected_output.clone(),
                    final_size: 4096,
                    met_target: true
                }
            );

            let calls = spawner.received_calls();
            assert_eq!(calls.len(), 1);
            let call = &calls[0];
            assert!(call.windows(2).any(|w| w[0] == "-b:v" && w[1] == "1502k"));
            assert!(call.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx265"));
            assert_eq!(call.last().map(String::as_str), expected_output.to_str());
        }

        #[test]
        fn test_missed_target_is_reported() {
            let (dir, input, sizes) = setup(3 * GB);
            let output = dir.path().join("out").join("small.mp4");
            sizes.0.borrow_mut().insert(output.clone(), GB + 1);
            let spawner = MockFfmpegSpawner::new();
            spawner.push_success_with_output(16);
            let prober = prober("3600.0", 1920, 1080, "30/1");

            let options = CompressOptions {
                output: Some(output.clone()),
                ..CompressOptions::default()
            };
            let outcome = compress_video_to_size(&spawner, &prober, &sizes, &input, &options).unwrap();

            assert!(matches!(
                outcome,
                CompressOutcome::Compressed { met_target: false, .. }
            ));
            assert_eq!(outcome.path(), output.as_path());
        }

        #[test]
        fn test_missing_input_fails_before_probing() {
            let spawner = MockFfmpegSpawner::new();
            let prober = prober("10.0", 640, 480, "25/1");
            let err = compress_video_to_size(
                &spawner,
                &prober,
                &FakeSizes::default(),
                Path::new("/definitely/missing/movie.mov"),
                &CompressOptions::default(),
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::InputNotFound(_)));
        }

        #[test]
        fn test_encoder_failure_is_an_error() {
            let (_dir, input, sizes) = setup(2 * GB);
            let spawner = MockFfmpegSpawner::new();
            spawner.push_exit_failure(
                vec![ffmpeg_sidecar::event::FfmpegEvent::Error(
                    "Unknown encoder 'libx265'".to_string(),
                )],
                1,
            );
            let prober = prober("3600.0", 1920, 1080, "30/1");

            let err =
                compress_video_to_size(&spawner, &prober, &sizes, &input, &CompressOptions::default())
                    .unwrap_err();
            assert!(matches!(err, CoreError::CommandFailed(_, _, ref stderr) if stderr.contains("libx265")));
        }
    }
}
