// ============================================================================
// utilkit-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the utilkit Core Library
//
// This module defines the single error enum shared by every tool in the
// library, along with helper constructors for the external-command cases.
//
// KEY COMPONENTS:
// - CoreError: All failure modes of the library
// - CoreResult: Result alias used by every public function
// - command_*_error: Helpers that build errors for spawned processes
//
// AI-ASSISTANT-INFO: Error types and helper constructors for utilkit-core

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the utilkit core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Required dependency '{0}' not found. Please install it and make sure it is on your PATH.")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Command '{0}' failed with status {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("ffprobe error: {0}")]
    FfprobeParse(String),

    #[error("Could not get video information: {0}")]
    VideoInfoError(String),

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF extraction error: {0}")]
    PdfExtract(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for utilkit core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a process that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] for a process that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

/// Builds a [`CoreError::CommandWait`] for a process whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

impl From<walkdir::Error> for CoreError {
    fn from(err: walkdir::Error) -> Self {
        match err.into_io_error() {
            Some(io_err) => CoreError::Io(io_err),
            None => CoreError::PathError("filesystem loop detected while walking directory".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_not_found_message() {
        let err = CoreError::DependencyNotFound("ffmpeg".to_string());
        assert!(err.to_string().contains("'ffmpeg' not found"));
    }

    #[test]
    fn test_command_start_error_keeps_source() {
        let err = command_start_error("ffmpeg", io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(matches!(err, CoreError::CommandStart(ref cmd, _) if cmd == "ffmpeg"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_conversion() {
        let err: CoreError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
