// ============================================================================
// utilkit-core/src/config/mod.rs
// ============================================================================
//
// CONFIGURATION: Defaults and Environment Overrides
//
// This module holds the constants every tool relies on (bitrate headroom,
// encoder presets, calendar window) and the `EncoderSettings` structure that
// lets a user override the encoder defaults through environment variables.
//
// KEY COMPONENTS:
// - Default constants for compression, conversion and calendar export
// - EncoderSettings: encoder parameters with `UTILKIT_*` overrides
//
// AI-ASSISTANT-INFO: Configuration constants and env overrides for utilkit-core

pub mod utils;

use crate::error::{CoreError, CoreResult};
use utils::{get_env_string, get_env_u8};

// ============================================================================
// COMPRESSION DEFAULTS
// ============================================================================

/// Target output size in GB when none is given.
pub const DEFAULT_TARGET_SIZE_GB: f64 = 1.0;

/// Share of the target size reserved for the video stream. The rest covers
/// audio and container overhead.
pub const BITRATE_HEADROOM: f64 = 0.9;

/// Bitrate ceiling (kbps) applied when downscaling to 1080p.
pub const MAX_1080P_BITRATE_KBPS: u64 = 12_000;

/// Bitrate multiplier for HEVC, assumed 30% more efficient than H.264.
pub const HEVC_BITRATE_FACTOR: f64 = 0.7;

/// Scale filter used for the 1080p downscale.
pub const SCALE_1080P_FILTER: &str = "scale=1920:1080";

/// Frame rate used when the frame-rate cap is requested.
pub const CAPPED_FRAME_RATE: u32 = 30;

pub const H264_ENCODER: &str = "libx264";
pub const HEVC_ENCODER: &str = "libx265";

// ============================================================================
// CONVERSION DEFAULTS
// ============================================================================

/// Container used when the user leaves the format prompt empty.
pub const DEFAULT_CONVERT_FORMAT: &str = "mp4";

// ============================================================================
// CALENDAR DEFAULTS
// ============================================================================

/// Days before now that still count as upcoming.
pub const CALENDAR_WINDOW_DAYS_BEFORE: i64 = 1;

/// Days after now covered by the export.
pub const CALENDAR_WINDOW_DAYS_AFTER: i64 = 365;

/// Upper bound on occurrences generated for a single recurring event.
pub const MAX_RECURRENCES_PER_EVENT: u16 = 2_000;

/// Spreadsheet name used when no output name is given.
pub const DEFAULT_SPREADSHEET_NAME: &str = "output.xlsx";

// ============================================================================
// ENCODER SETTINGS
// ============================================================================

/// Encoder parameters shared by the compressor and the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// x264/x265 speed preset.
    pub preset: String,
    /// Audio bitrate used by the compressor (ffmpeg syntax, e.g. `128k`).
    pub compress_audio_bitrate: String,
    /// CRF used by the converter.
    pub convert_crf: u8,
    /// Audio bitrate used by the converter.
    pub convert_audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            preset: "medium".to_string(),
            compress_audio_bitrate: "128k".to_string(),
            convert_crf: 23,
            convert_audio_bitrate: "192k".to_string(),
        }
    }
}

impl EncoderSettings {
    /// Builds settings from the defaults, applying any `UTILKIT_*` overrides.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            preset: get_env_string("UTILKIT_PRESET", defaults.preset),
            compress_audio_bitrate: get_env_string(
                "UTILKIT_AUDIO_BITRATE",
                defaults.compress_audio_bitrate,
            ),
            convert_crf: get_env_u8("UTILKIT_CONVERT_CRF", defaults.convert_crf),
            convert_audio_bitrate: get_env_string(
                "UTILKIT_CONVERT_AUDIO_BITRATE",
                defaults.convert_audio_bitrate,
            ),
        }
    }

    /// Rejects values ffmpeg would refuse.
    pub fn validate(&self) -> CoreResult<()> {
        if self.preset.trim().is_empty() {
            return Err(CoreError::Config("encoder preset must not be empty".to_string()));
        }
        if self.convert_crf > 51 {
            return Err(CoreError::Config(format!(
                "CRF must be between 0 and 51, got {}",
                self.convert_crf
            )));
        }
        for bitrate in [&self.compress_audio_bitrate, &self.convert_audio_bitrate] {
            let digits = bitrate.trim_end_matches(['k', 'K', 'm', 'M']);
            if digits.is_empty() || digits.parse::<u32>().is_err() {
                return Err(CoreError::Config(format!("invalid audio bitrate '{bitrate}'")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.preset, "medium");
        assert_eq!(settings.convert_crf, 23);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = EncoderSettings::default();
        settings.convert_crf = 60;
        assert!(matches!(settings.validate(), Err(CoreError::Config(_))));

        let mut settings = EncoderSettings::default();
        settings.compress_audio_bitrate = "loud".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        unsafe {
            std::env::set_var("UTILKIT_PRESET", "slow");
            std::env::set_var("UTILKIT_CONVERT_CRF", "18");
        }

        let settings = EncoderSettings::from_env();
        assert_eq!(settings.preset, "slow");
        assert_eq!(settings.convert_crf, 18);
        assert_eq!(settings.compress_audio_bitrate, "128k");

        unsafe {
            std::env::remove_var("UTILKIT_PRESET");
            std::env::remove_var("UTILKIT_CONVERT_CRF");
        }
    }
}
