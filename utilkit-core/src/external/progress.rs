//! `FFmpeg` progress handler
//!
//! Turns the event stream of a running ffmpeg process into a progress bar,
//! periodic log lines and a buffer of error output for failure reports.

use crate::error::CoreResult;
use crate::terminal;
use crate::utils::{format_duration, parse_ffmpeg_time};
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};

/// Handler for `FFmpeg` progress events
pub struct FfmpegProgressHandler {
    label: String,
    duration: Option<f64>,
    last_logged_percent_threshold: i32,
    stderr_buffer: String,
    showed_progress: bool,
}

impl FfmpegProgressHandler {
    /// Creates a new handler. `duration` is the input length in seconds, if known.
    #[must_use]
    pub fn new(label: &str, duration: Option<f64>) -> Self {
        Self {
            label: label.to_string(),
            duration: duration.filter(|d| *d > 0.0),
            last_logged_percent_threshold: -1,
            stderr_buffer: String::new(),
            showed_progress: false,
        }
    }

    /// Handles an `FFmpeg` event
    pub fn handle_event(&mut self, event: FfmpegEvent) -> CoreResult<()> {
        match event {
            FfmpegEvent::ParsedDuration(parsed) => {
                if self.duration.is_none() && parsed.duration > 0.0 {
                    self.duration = Some(parsed.duration);
                }
            }
            FfmpegEvent::Progress(progress) => self.handle_progress(&progress),
            FfmpegEvent::Log(level, message) => self.handle_log(&level, &message),
            FfmpegEvent::Error(error) => self.handle_error(&error),
            _ => {}
        }
        Ok(())
    }

    /// Gets the accumulated error output
    #[must_use]
    pub fn stderr_buffer(&self) -> &str {
        &self.stderr_buffer
    }

    /// Closes the progress bar, if one was shown.
    pub fn finish(&mut self) {
        if self.showed_progress {
            terminal::finish_progress_bar();
            self.showed_progress = false;
        }
    }

    fn handle_progress(&mut self, progress: &FfmpegProgress) {
        let current_secs = parse_ffmpeg_time(&progress.time).unwrap_or(0.0);
        let Some(total) = self.duration else {
            log::debug!("{} progress: {} processed", self.label, progress.time);
            return;
        };

        let percent = (current_secs / total * 100.0).clamp(0.0, 100.0);
        terminal::print_progress_bar(&self.label, current_secs, total, Some(progress.speed));
        self.showed_progress = true;

        let threshold = (percent as i32 / 10) * 10;
        if threshold > self.last_logged_percent_threshold {
            log::debug!(
                "{} progress: {:.1}% | Time: {} / {} | Speed: {:.2}x",
                self.label,
                percent,
                format_duration(current_secs),
                format_duration(total),
                progress.speed
            );
            self.last_logged_percent_threshold = threshold;
        }
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: &str) {
        let log_level = map_ffmpeg_log_level(level);
        if log_level <= log::Level::Error {
            self.stderr_buffer.push_str(message);
            self.stderr_buffer.push('\n');
        }

        if log_level == log::Level::Info {
            log::debug!(target: "ffmpeg_log", "{message}");
        } else {
            log::log!(target: "ffmpeg_log", log_level, "{message}");
        }
    }

    fn handle_error(&mut self, error: &str) {
        log::debug!(target: "ffmpeg_log", "ffmpeg stderr error: {error}");
        self.stderr_buffer.push_str(error);
        self.stderr_buffer.push('\n');
    }
}

/// Maps `FFmpeg` log level to Rust log level
fn map_ffmpeg_log_level(level: &FfmpegLogLevel) -> log::Level {
    match level {
        FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => log::Level::Error,
        FfmpegLogLevel::Warning => log::Level::Warn,
        FfmpegLogLevel::Info => log::Level::Info,
        _ => log::Level::Trace,
    }
}
