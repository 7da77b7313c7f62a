// ============================================================================
// utilkit-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg, ffprobe and the File System
//
// This module encapsulates interactions with the external command-line tools
// the video commands depend on, as well as file size lookups. Each interaction
// sits behind a trait so the compressor and converter can be tested without
// real binaries.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: spawning ffmpeg and consuming its events
// - VideoProber: ffprobe metadata lookup
// - FfmpegProgressHandler: turns ffmpeg events into progress output
// - Dependency checking and file metadata access
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Progress and stderr handling for running ffmpeg processes
pub mod progress;

#[cfg(all(test, unix))]
pub(crate) mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_ffmpeg};
pub use ffprobe_executor::{CrateFfprobeExecutor, VideoProber};
pub use progress::FfmpegProgressHandler;

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that a required external command can be found on `PATH`.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The resolved location of the command
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
pub fn check_dependency(cmd_name: &str) -> CoreResult<PathBuf> {
    match which::which(cmd_name) {
        Ok(path) => {
            log::debug!("Found dependency {} at {}", cmd_name, path.display());
            Ok(path)
        }
        Err(e) => {
            log::warn!("Dependency '{}' not found: {}", cmd_name, e);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
    }
}

/// Checks that ffmpeg is installed and accessible.
pub fn check_ffmpeg_installed() -> CoreResult<()> {
    check_dependency("ffmpeg").map(|_| ())
}

// ============================================================================
// FILE METADATA ACCESS
// ============================================================================

/// Trait for abstracting file metadata access operations.
///
/// ```rust,no_run
/// use utilkit_core::external::FileMetadataProvider;
/// use utilkit_core::CoreResult;
/// use std::path::Path;
///
/// struct FixedSize;
///
/// impl FileMetadataProvider for FixedSize {
///     fn get_size(&self, _path: &Path) -> CoreResult<u64> {
///         Ok(1_000_000)
///     }
/// }
///
/// let size = FixedSize.get_size(Path::new("/fake/path")).unwrap();
/// assert_eq!(size, 1_000_000);
/// ```
pub trait FileMetadataProvider {
    /// Gets the size of the file at the given path in bytes.
    fn get_size(&self, path: &Path) -> CoreResult<u64>;
}

/// Standard implementation of FileMetadataProvider using `std::fs::metadata`.
#[derive(Debug, Clone, Default)]
pub struct StdFsMetadataProvider;

impl FileMetadataProvider for StdFsMetadataProvider {
    fn get_size(&self, path: &Path) -> CoreResult<u64> {
        Ok(std::fs::metadata(path)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency() {
        let result = check_dependency("utilkit-definitely-not-a-real-binary");
        assert!(matches!(result, Err(CoreError::DependencyNotFound(name)) if name == "utilkit-definitely-not-a-real-binary"));
    }

    #[test]
    fn test_std_fs_metadata_provider() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sized.bin");
        std::fs::write(&file, vec![0u8; 2048]).unwrap();

        assert_eq!(StdFsMetadataProvider.get_size(&file).unwrap(), 2048);
        assert!(StdFsMetadataProvider.get_size(&dir.path().join("missing")).is_err());
    }
}
