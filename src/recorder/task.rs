use super::{ProcessExit, RecorderProcess};
use crate::log_debug;
use anyhow::{Context, Result};
use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

/// How often the task checks the process and the cancel flag.
const SUPERVISE_POLL: Duration = Duration::from_millis(50);

/// Revocable signal shared between the session and its recording task.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Completion handle for one recording session.
pub struct RecordingTask {
    label: String,
    handle: Option<JoinHandle<io::Result<ProcessExit>>>,
}

impl RecordingTask {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True once the recorder has exited and the thread is about to return.
    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(JoinHandle::is_finished)
            .unwrap_or(true)
    }

    /// Blocks until the recording thread returns.
    ///
    /// Revoke the task's [`CancelToken`] first, otherwise this waits for the
    /// recorder to exit on its own. There is no timeout: a recorder that ignores
    /// SIGINT keeps the caller blocked.
    pub fn join(mut self) -> Option<ProcessExit> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(Ok(exit)) => {
                log_debug(&format!(
                    "Recording task for {} finished (exit code {:?})",
                    self.label, exit.code
                ));
                Some(exit)
            }
            Ok(Err(err)) => {
                log_debug(&format!(
                    "Recording task for {} lost track of the recorder: {err}",
                    self.label
                ));
                None
            }
            Err(_) => {
                log_debug(&format!("Recording task for {} panicked", self.label));
                None
            }
        }
    }
}

type SharedProcess = Arc<Mutex<Option<Box<dyn RecorderProcess>>>>;
type TaskBody = Box<dyn FnOnce() -> io::Result<ProcessExit> + Send>;

/// Hand `process` to a dedicated thread that stops it once `cancel` is revoked.
///
/// If the thread cannot be started the recorder is interrupted and reaped
/// before the error is returned.
pub fn spawn_recording_task(
    process: Box<dyn RecorderProcess>,
    label: String,
    cancel: CancelToken,
) -> Result<RecordingTask> {
    spawn_with(process, label, cancel, |body| {
        thread::Builder::new()
            .name("tape-recorder".to_string())
            .spawn(body)
    })
}

fn spawn_with<S>(
    process: Box<dyn RecorderProcess>,
    label: String,
    cancel: CancelToken,
    spawn: S,
) -> Result<RecordingTask>
where
    S: FnOnce(TaskBody) -> io::Result<JoinHandle<io::Result<ProcessExit>>>,
{
    let slot: SharedProcess = Arc::new(Mutex::new(Some(process)));
    let thread_slot = Arc::clone(&slot);
    let thread_label = label.clone();
    let body: TaskBody = Box::new(move || {
        let process = take_process(&thread_slot)
            .ok_or_else(|| io::Error::other("recorder process already taken"))?;
        supervise(process, &thread_label, &cancel)
    });

    match spawn(body) {
        Ok(handle) => Ok(RecordingTask {
            label,
            handle: Some(handle),
        }),
        Err(err) => {
            if let Some(process) = take_process(&slot) {
                log_debug(&format!(
                    "Could not start recording task for {label}; stopping recorder"
                ));
                let _ = stop(process, &label);
            }
            Err(err).context("failed to spawn recording task thread")
        }
    }
}

fn take_process(slot: &SharedProcess) -> Option<Box<dyn RecorderProcess>> {
    slot.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take()
}

fn supervise(
    mut process: Box<dyn RecorderProcess>,
    label: &str,
    cancel: &CancelToken,
) -> io::Result<ProcessExit> {
    loop {
        match process.try_wait() {
            Ok(Some(exit)) => {
                log_debug(&format!(
                    "Recorder for {label} exited before stop (exit code {:?})",
                    exit.code
                ));
                return Ok(exit);
            }
            Ok(None) => {}
            Err(err) => {
                log_debug(&format!("Cannot poll recorder for {label} ({err}); stopping it"));
                return stop(process, label);
            }
        }
        if cancel.is_cancelled() {
            log_debug(&format!("Recording of {label} cancelled; sending SIGINT"));
            return stop(process, label);
        }
        thread::sleep(SUPERVISE_POLL);
    }
}

/// SIGINT, then block until the recorder has exited.
fn stop(mut process: Box<dyn RecorderProcess>, label: &str) -> io::Result<ProcessExit> {
    if let Err(err) = process.interrupt() {
        log_debug(&format!("Failed to interrupt recorder for {label}: {err}"));
    }
    process.wait()
}
