// ============================================================================
// utilkit-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes. The compressor and the converter both go through `run_ffmpeg`,
// which spawns the command, feeds its events to a progress handler and turns
// a non-zero exit into a `CommandFailed` error carrying ffmpeg's error text.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - run_ffmpeg: Spawn, drain events, wait and check the exit status
//
// AI-ASSISTANT-INFO: FFmpeg process management and execution abstraction

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::external::progress::FfmpegProgressHandler;
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(FfmpegChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            command_failed_error("ffmpeg (event stream)", ExitStatus::default(), e.to_string())
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

/// Runs ffmpeg with the given arguments and waits for it to finish.
///
/// `label` names the job in progress output and errors. `duration` (seconds)
/// drives the progress percentage; when unknown, the duration ffmpeg reports
/// for its input is used instead.
pub fn run_ffmpeg<S: FfmpegSpawner>(
    spawner: &S,
    args: &[String],
    label: &str,
    duration: Option<f64>,
) -> CoreResult<()> {
    let mut cmd = FfmpegCommand::new();
    cmd.args(args);
    log::debug!("Running {} command: ffmpeg {}", label, args.join(" "));

    let mut process = spawner.spawn(cmd)?;
    let mut handler = FfmpegProgressHandler::new(label, duration);
    let events_result = process.handle_events(|event| handler.handle_event(event));
    handler.finish();
    events_result?;

    let status = process.wait()?;
    if !status.success() {
        log::error!("{} failed: {}", label, status);
        return Err(command_failed_error(
            format!("ffmpeg {}", args.join(" ")),
            status,
            handler.stderr_buffer().trim_end().to_string(),
        ));
    }

    log::debug!("{} finished successfully", label);
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::external::mocks::MockFfmpegSpawner;
    use ffmpeg_sidecar::event::LogLevel;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_run_ffmpeg_passes_arguments() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push_success(Vec::new());

        run_ffmpeg(&spawner, &args(&["-i", "in.mov", "-y", "out.mp4"]), "Test", Some(10.0)).unwrap();

        let calls = spawner.received_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with(&args(&["-i", "in.mov", "-y", "out.mp4"])));
    }

    #[test]
    fn test_run_ffmpeg_failure_carries_stderr() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push_exit_failure(
            vec![
                FfmpegEvent::Error("Unknown encoder 'libx265'".to_string()),
                FfmpegEvent::Log(LogLevel::Fatal, "Conversion failed!".to_string()),
            ],
            1,
        );

        let err = run_ffmpeg(&spawner, &args(&["-i", "in.mov", "out.mp4"]), "Test", None).unwrap_err();
        match err {
            CoreError::CommandFailed(cmd, status, stderr) => {
                assert!(cmd.contains("-i in.mov out.mp4"));
                assert!(!status.success());
                assert!(stderr.contains("Unknown encoder 'libx265'"));
                assert!(stderr.contains("Conversion failed!"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_run_ffmpeg_spawn_error() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push_spawn_error(std::io::ErrorKind::NotFound);

        let err = run_ffmpeg(&spawner, &args(&["-version"]), "Test", None).unwrap_err();
        assert!(matches!(err, CoreError::CommandStart(_, _)));
    }
}
