//! Video metadata collection and the analysis report.
//!
//! `VideoInfo` is built from ffprobe metadata plus the on-disk file size.
//! Missing stream fields stay `None` and are shown as unknown in the report.

use crate::config::BITRATE_HEADROOM;
use crate::error::{CoreError, CoreResult};
use crate::external::{FileMetadataProvider, VideoProber};
use crate::terminal;
use crate::utils::{BYTES_PER_GB, bytes_to_gb, parse_frame_rate};
use ffprobe::{FfProbe, Stream};
use serde::Serialize;
use std::path::Path;

/// Summary of a video file used by the compressor and the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    /// Duration in seconds.
    pub duration: f64,
    /// Overall bitrate in bits per second, derived from size and duration.
    pub current_bitrate: f64,
    /// File size in bytes.
    pub file_size: u64,
    pub format_name: String,
    pub video: Option<VideoStreamInfo>,
    pub audio: Option<AudioStreamInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStreamInfo {
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub pixel_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioStreamInfo {
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
}

impl VideoInfo {
    /// Builds the summary from ffprobe metadata and the file size in bytes.
    pub fn from_probe(probe: &FfProbe, file_size: u64) -> CoreResult<Self> {
        let duration = probe
            .format
            .duration
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| {
                CoreError::VideoInfoError("container reports no usable duration".to_string())
            })?;

        let format_name = if probe.format.format_name.is_empty() {
            "unknown".to_string()
        } else {
            probe.format.format_name.clone()
        };

        let video = find_stream(probe, "video").map(|s| VideoStreamInfo {
            codec: s.codec_name.clone(),
            bitrate: parse_number(s.bit_rate.as_deref()),
            width: s.width.and_then(|w| u32::try_from(w).ok()),
            height: s.height.and_then(|h| u32::try_from(h).ok()),
            fps: parse_frame_rate(&s.r_frame_rate),
            pixel_format: s.pix_fmt.clone(),
        });

        let audio = find_stream(probe, "audio").map(|s| AudioStreamInfo {
            codec: s.codec_name.clone(),
            bitrate: parse_number(s.bit_rate.as_deref()),
            sample_rate: parse_number(s.sample_rate.as_deref()).and_then(|r| u32::try_from(r).ok()),
            channels: s.channels.and_then(|c| u32::try_from(c).ok()),
        });

        Ok(Self {
            duration,
            current_bitrate: file_size as f64 * 8.0 / duration,
            file_size,
            format_name,
            video,
            audio,
        })
    }

    pub fn size_gb(&self) -> f64 {
        bytes_to_gb(self.file_size)
    }

    pub fn is_4k(&self) -> bool {
        self.video.as_ref().is_some_and(|v| {
            v.width.is_some_and(|w| w >= 3840) || v.height.is_some_and(|h| h >= 2160)
        })
    }

    pub fn fps(&self) -> Option<f64> {
        self.video.as_ref().and_then(|v| v.fps)
    }
}

fn find_stream<'a>(probe: &'a FfProbe, codec_type: &str) -> Option<&'a Stream> {
    probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some(codec_type))
}

fn parse_number(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse::<u64>().ok())
}

/// Bits per second that would produce `target_size_gb` over `duration_secs`,
/// keeping 10% of the budget for audio and container overhead.
pub fn calculate_target_bitrate(duration_secs: f64, target_size_gb: f64) -> CoreResult<u64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(CoreError::VideoInfoError(format!(
            "cannot target a size for a duration of {duration_secs} seconds"
        )));
    }
    let target_size_bytes = target_size_gb * BYTES_PER_GB;
    Ok((target_size_bytes * BITRATE_HEADROOM * 8.0 / duration_secs) as u64)
}

/// Probes `input_path` and returns its summary.
pub fn get_video_info<P: VideoProber, M: FileMetadataProvider>(
    prober: &P,
    metadata: &M,
    input_path: &Path,
) -> CoreResult<VideoInfo> {
    let probe = prober.probe(input_path)?;
    let file_size = metadata.get_size(input_path)?;
    let info = VideoInfo::from_probe(&probe, file_size).map_err(|e| match e {
        CoreError::VideoInfoError(msg) => {
            CoreError::VideoInfoError(format!("{}: {msg}", input_path.display()))
        }
        other => other,
    })?;
    log::debug!("Video info for {}: {:?}", input_path.display(), info);
    Ok(info)
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "Unknown".to_string(), |v| v.to_string())
}

/// Prints the file, video stream and audio stream report.
pub fn print_video_details(info: &VideoInfo) {
    terminal::print_section("Video file analysis");

    let size_mb = info.file_size as f64 / (1024.0 * 1024.0);
    terminal::print_status(
        "File size",
        &format!("{:.3} GB ({:.1} MB)", info.size_gb(), size_mb),
        true,
    );
    terminal::print_status(
        "Duration",
        &format!("{:.1} minutes ({:.1} seconds)", info.duration / 60.0, info.duration),
        false,
    );
    terminal::print_status("Container", &info.format_name.to_uppercase(), false);
    terminal::print_status(
        "Overall Bitrate",
        &format!("{} kbps", (info.current_bitrate / 1000.0) as u64),
        false,
    );

    terminal::print_subsection("Video stream");
    match &info.video {
        Some(video) => {
            terminal::print_status("Codec", &or_unknown(video.codec.as_deref().map(str::to_uppercase)), false);
            terminal::print_status(
                "Resolution",
                &format!("{}x{}", or_unknown(video.width), or_unknown(video.height)),
                false,
            );
            terminal::print_status(
                "Frame rate",
                &video.fps.map_or_else(|| "Unknown".to_string(), |f| format!("{f:.2} fps")),
                false,
            );
            terminal::print_status("Pixel format", &or_unknown(video.pixel_format.as_deref()), false);
            terminal::print_status(
                "Video Bitrate",
                &video.bitrate.map_or_else(
                    || "Not specified in metadata".to_string(),
                    |b| format!("{} kbps", b / 1000),
                ),
                false,
            );
        }
        None => terminal::print_warning("No video stream found"),
    }

    terminal::print_subsection("Audio stream");
    match &info.audio {
        Some(audio) => {
            terminal::print_status("Codec", &or_unknown(audio.codec.as_deref().map(str::to_uppercase)), false);
            terminal::print_status(
                "Audio Bitrate",
                &audio.bitrate.map_or_else(
                    || "Not specified in metadata".to_string(),
                    |b| format!("{} kbps", b / 1000),
                ),
                false,
            );
            terminal::print_status(
                "Sample rate",
                &audio.sample_rate.map_or_else(|| "Unknown".to_string(), |r| format!("{r} Hz")),
                false,
            );
            terminal::print_status("Channels", &or_unknown(audio.channels), false);
        }
        None => terminal::print_warning("No audio stream found"),
    }
}

/// Compression suggestions for an analyzed file, one line each.
pub fn recommendations(info: &VideoInfo) -> CoreResult<Vec<String>> {
    let size_gb = info.size_gb();
    let mut lines = vec![format!("Current size: {size_gb:.3} GB")];

    if info.is_4k() {
        let (width, height) = info
            .video
            .as_ref()
            .map(|v| (or_unknown(v.width), or_unknown(v.height)))
            .unwrap_or_default();
        let fps = info.fps().unwrap_or(0.0);

        lines.push("4K video detected".to_string());
        lines.push(format!("Resolution: {width}x{height}"));
        lines.push(format!("Frame rate: {fps:.1} fps"));
        lines.push("High quality 4K content requires high bitrates for good results".to_string());

        if size_gb > 1.0 {
            let kbps = calculate_target_bitrate(info.duration, 1.0)? / 1000;
            lines.push(format!("For 1.0 GB (maintaining 4K): ~{kbps} kbps"));
            lines.push("Alternative: downscale to 1080p (--1080p), ~8,000-12,000 kbps for a much smaller file".to_string());
            lines.push("Alternative: use H.265/HEVC (--hevc), ~50% smaller than H.264".to_string());
            if fps > 30.0 {
                lines.push(format!(
                    "Alternative: reduce frame rate to 30fps (--30fps), ~{:.1}x smaller",
                    fps / 30.0
                ));
            }
        }

        lines.push("Trade-off: 4K at current quality gives very large files".to_string());
        lines.push("Trade-off: 4K at a lower bitrate may lose quality".to_string());
        lines.push("Trade-off: 1080p at a good bitrate is much smaller and still looks great".to_string());
    } else {
        if size_gb > 1.0 {
            let kbps = calculate_target_bitrate(info.duration, 1.0)? / 1000;
            lines.push(format!("For 1.0 GB: use bitrate ~{kbps} kbps"));
        }
        if size_gb > 0.5 {
            let kbps = calculate_target_bitrate(info.duration, 0.5)? / 1000;
            lines.push(format!("For 0.5 GB: use bitrate ~{kbps} kbps"));
        }
    }

    Ok(lines)
}

/// Probes `input_path`, prints the report and the recommendations.
pub fn analyze_video<P: VideoProber, M: FileMetadataProvider>(
    prober: &P,
    metadata: &M,
    input_path: &Path,
) -> CoreResult<VideoInfo> {
    if !input_path.exists() {
        return Err(CoreError::InputNotFound(format!(
            "Input file does not exist: {}",
            input_path.display()
        )));
    }

    let info = get_video_info(prober, metadata, input_path)?;
    print_video_details(&info);

    terminal::print_subsection("Compression recommendations");
    for line in recommendations(&info)? {
        terminal::print_sub_item(&line);
    }

    Ok(info)
}
