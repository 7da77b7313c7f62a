//! FFprobe integration for media analysis
//!
//! The compressor reads container and stream metadata through the
//! `VideoProber` trait so its analysis can be tested with canned metadata.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbe, FfProbeError};
use std::path::Path;

/// Something that can produce ffprobe metadata for a media file.
pub trait VideoProber {
    fn probe(&self, input_path: &Path) -> CoreResult<FfProbe>;
}

/// Production prober backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl VideoProber for CrateFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<FfProbe> {
        log::debug!("Running ffprobe (via crate) on: {}", input_path.display());
        ffprobe::ffprobe(input_path).map_err(|err| {
            log::error!("ffprobe failed on {}: {:?}", input_path.display(), err);
            map_ffprobe_error(err, input_path)
        })
    }
}

fn map_ffprobe_error(err: FfProbeError, input_path: &Path) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(
                format!("ffprobe {}", input_path.display()),
                output.status,
                stderr,
            )
        }
        FfProbeError::Deserialize(err) => CoreError::FfprobeParse(format!(
            "could not read ffprobe output for {}: {err}",
            input_path.display()
        )),
        _ => CoreError::FfprobeParse(format!(
            "unknown ffprobe error for {}: {err:?}",
            input_path.display()
        )),
    }
}
