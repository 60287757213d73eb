use super::{ProcessExit, Recorder, RecorderProcess};
use crate::log_debug;
use anyhow::{Context, Result};
use std::{
    io,
    path::PathBuf,
    process::{Child, Command, Stdio},
};

/// Everything needed to build the recorder command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderSpec {
    pub command: String,
    pub codec: String,
    pub crf: u8,
    pub working_dir: PathBuf,
}

impl RecorderSpec {
    /// Arguments for one session, e.g. `-c libx264 -p crf=14 -f A.mkv`.
    pub fn args(&self, label: &str) -> Vec<String> {
        vec![
            "-c".to_string(),
            self.codec.clone(),
            "-p".to_string(),
            format!("crf={}", self.crf),
            "-f".to_string(),
            label.to_string(),
        ]
    }

    /// Shell-ish rendering used by the doctor report and logs.
    pub fn command_line(&self, label: &str) -> String {
        let mut parts = vec![self.command.clone()];
        parts.extend(self.args(label));
        parts.join(" ")
    }
}

/// Spawns the real recorder binary.
#[derive(Debug, Clone)]
pub struct SystemRecorder {
    spec: RecorderSpec,
}

impl SystemRecorder {
    pub fn new(spec: RecorderSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &RecorderSpec {
        &self.spec
    }
}

impl Recorder for SystemRecorder {
    fn launch(&self, label: &str) -> Result<Box<dyn RecorderProcess>> {
        log_debug(&format!("Launching recorder: {}", self.spec.command_line(label)));
        // The recorder must not draw over the TUI or read its keystrokes.
        let child = Command::new(&self.spec.command)
            .args(self.spec.args(label))
            .current_dir(&self.spec.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to launch recorder '{}'", self.spec.command))?;
        Ok(Box::new(ChildProcess { child }))
    }
}

struct ChildProcess {
    child: Child,
}

impl RecorderProcess for ChildProcess {
    fn interrupt(&mut self) -> io::Result<()> {
        send_interrupt(self.child.id())
    }

    fn try_wait(&mut self) -> io::Result<Option<ProcessExit>> {
        Ok(self.child.try_wait()?.map(ProcessExit::from))
    }

    fn wait(&mut self) -> io::Result<ProcessExit> {
        self.child.wait().map(ProcessExit::from)
    }
}

/// Deliver SIGINT so the recorder can flush and close its container.
pub fn send_interrupt(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        let pid = libc::pid_t::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
        // SAFETY: kill(2) has no memory-safety preconditions.
        if unsafe { libc::kill(pid, libc::SIGINT) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "interrupting the recorder is only supported on unix",
        ))
    }
}
