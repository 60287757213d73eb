//! Screen recorder plumbing.
//!
//! A [`Recorder`] launches one external process per session. The process is
//! handed to a recording task thread that watches a [`CancelToken`]; revoking
//! the token makes the task send SIGINT and wait for the recorder to finalize
//! its output file. The task's join handle is the session's completion handle.

#[cfg(test)]
pub(crate) mod fake;
mod process;
mod task;

use anyhow::Result;
use std::io;

pub use process::{send_interrupt, RecorderSpec, SystemRecorder};
pub use task::{spawn_recording_task, CancelToken, RecordingTask};

/// How a recorder process ended. `code` is `None` when a signal terminated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Handle to a running recorder process.
pub trait RecorderProcess: Send {
    /// Ask the process to finish up (SIGINT, never a kill).
    fn interrupt(&mut self) -> io::Result<()>;
    /// Non-blocking exit check.
    fn try_wait(&mut self) -> io::Result<Option<ProcessExit>>;
    /// Block until the process exits.
    fn wait(&mut self) -> io::Result<ProcessExit>;
}

/// Launches a recorder writing to `label`.
pub trait Recorder {
    fn launch(&self, label: &str) -> Result<Box<dyn RecorderProcess>>;
}
