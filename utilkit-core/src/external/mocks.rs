// utilkit-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use crate::error::{CoreResult, command_start_error};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::rc::Rc;

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    events_to_emit: Vec<FfmpegEvent>,
    exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.drain(..) {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

enum MockOutcome {
    Run {
        events: Vec<FfmpegEvent>,
        exit_code: i32,
        output_bytes: Option<usize>,
    },
    SpawnError(std::io::ErrorKind),
}

/// Mock spawner that replays queued outcomes in order and records every
/// argument list it receives.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    outcomes: Rc<RefCell<VecDeque<MockOutcome>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push_success(&self, events: Vec<FfmpegEvent>) {
        self.outcomes.borrow_mut().push_back(MockOutcome::Run {
            events,
            exit_code: 0,
            output_bytes: None,
        });
    }

    /// Succeeds and writes `bytes` zero bytes to the last argument (the output path).
    pub fn push_success_with_output(&self, bytes: usize) {
        self.outcomes.borrow_mut().push_back(MockOutcome::Run {
            events: Vec::new(),
            exit_code: 0,
            output_bytes: Some(bytes),
        });
    }

    pub fn push_exit_failure(&self, events: Vec<FfmpegEvent>, exit_code: i32) {
        self.outcomes.borrow_mut().push_back(MockOutcome::Run {
            events,
            exit_code,
            output_bytes: None,
        });
    }

    pub fn push_spawn_error(&self, kind: std::io::ErrorKind) {
        self.outcomes
            .borrow_mut()
            .push_back(MockOutcome::SpawnError(kind));
    }

    pub fn received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let outcome = self.outcomes.borrow_mut().pop_front();
        match outcome {
            Some(MockOutcome::Run {
                events,
                exit_code,
                output_bytes,
            }) => {
                if let (Some(bytes), Some(output)) = (output_bytes, args.last()) {
                    let output = PathBuf::from(output);
                    if let Some(parent) = output.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&output, vec![0u8; bytes])?;
                }
                Ok(MockFfmpegProcess {
                    events_to_emit: events,
                    exit_status: ExitStatus::from_raw(exit_code << 8),
                })
            }
            Some(MockOutcome::SpawnError(kind)) => Err(command_start_error(
                "ffmpeg (mock)",
                std::io::Error::new(kind, "mock spawn failure"),
            )),
            None => panic!("MockFfmpegSpawner: unexpected ffmpeg call {args:?}"),
        }
    }
}
