//! Utility functions for formatting and path handling.
//!
//! This module provides general-purpose helpers used throughout the
//! utilkit-core library: byte and duration formatting, ffmpeg time and frame
//! rate parsing, and path normalization for user-entered paths.

use crate::error::CoreResult;
use std::path::PathBuf;

/// Bytes in one GB as used for size targets (binary gigabyte).
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Converts a byte count to GB.
#[must_use]
pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Parses FFmpeg time string (HH:MM:SS.MS) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Evaluates an ffprobe frame rate such as `30000/1001` or `25`.
/// A zero denominator yields None.
#[must_use]
pub fn parse_frame_rate(frame_rate: &str) -> Option<f64> {
    match frame_rate.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 { None } else { Some(num / den) }
        }
        None => frame_rate.trim().parse::<f64>().ok(),
    }
}

/// Expands a leading `~` and makes the path absolute against the current directory.
pub fn expand_user_path(raw: &str) -> CoreResult<PathBuf> {
    let expanded = shellexpand::tilde(raw.trim());
    let path = PathBuf::from(expanded.as_ref());
    Ok(std::path::absolute(&path)?)
}
