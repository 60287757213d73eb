//! Recording session controller.
//!
//! [`Session`] is the idle/running state machine behind the tape. It owns the
//! cancel token and completion handle of the active recording task, and it is
//! the only place that launches or stops the recorder. All methods run on the
//! event loop thread.

#[cfg(test)]
mod tests;

use crate::log_debug;
use crate::recorder::{spawn_recording_task, CancelToken, ProcessExit, Recorder, RecordingTask};
use crate::sequencer::{next_label_from, NameSource};
use anyhow::Result;
use std::time::Duration;

/// Number of spool animation frames; the frame index cycles through `0..FRAME_COUNT`.
pub const FRAME_COUNT: usize = 10;
/// Cadence of the animation/elapsed timer.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Timer message scheduled for one recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Recording started; schedule `first_tick` one interval from now.
    Started { first_tick: Tick },
    /// Recording stopped and the recorder has exited.
    Stopped { exit: Option<ProcessExit> },
}

/// Result of delivering a timer message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Elapsed time and frame advanced; schedule `next` one interval from now.
    Advanced { next: Tick },
    /// Idle, or the tick belonged to an earlier session.
    Ignored,
}

/// Everything the view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    running: bool,
    frame_index: usize,
    elapsed: Duration,
    label: String,
    generation: u64,
}

impl SessionState {
    fn idle(label: String) -> Self {
        Self {
            running: false,
            frame_index: 0,
            elapsed: Duration::ZERO,
            label,
            generation: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Output file name for the current (or next) session.
    pub fn label(&self) -> &str {
        &self.label
    }

    #[cfg(test)]
    pub(crate) fn for_view(
        running: bool,
        frame_index: usize,
        elapsed: Duration,
        label: &str,
    ) -> Self {
        Self {
            running,
            frame_index,
            elapsed,
            label: label.to_string(),
            generation: 0,
        }
    }

    fn reset_display(&mut self) {
        self.frame_index = 0;
        self.elapsed = Duration::ZERO;
    }
}

pub struct Session {
    state: SessionState,
    extension: String,
    recorder: Box<dyn Recorder>,
    names: Box<dyn NameSource>,
    cancel: CancelToken,
    task: Option<RecordingTask>,
}

impl Session {
    /// Pick the first label from the current listing. A listing failure is fatal.
    pub fn new(
        recorder: Box<dyn Recorder>,
        names: Box<dyn NameSource>,
        extension: impl Into<String>,
    ) -> Result<Self> {
        let extension = extension.into();
        let label = next_label_from(names.as_ref(), &extension)?;
        log_debug(&format!("Next output file: {label}"));
        Ok(Self {
            state: SessionState::idle(label),
            extension,
            recorder,
            names,
            cancel: CancelToken::new(),
            task: None,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Start recording when idle, stop when running.
    ///
    /// Stopping blocks until the recorder process has exited so the next
    /// label is computed against a finalized file. Errors (recorder launch,
    /// directory listing) are fatal to the program.
    pub fn toggle(&mut self) -> Result<Toggle> {
        if self.state.running {
            self.stop()
        } else {
            self.start()
        }
    }

    fn start(&mut self) -> Result<Toggle> {
        self.cancel = CancelToken::new();
        let label = self.state.label.clone();
        let process = self.recorder.launch(&label)?;
        let task = spawn_recording_task(process, label.clone(), self.cancel.clone())?;
        self.task = Some(task);

        self.state.running = true;
        self.state.reset_display();
        self.state.generation = self.state.generation.wrapping_add(1);
        log_debug(&format!("Recording started: {label}"));
        tracing::info!(label = %label, generation = self.state.generation, "recording started");
        Ok(Toggle::Started {
            first_tick: Tick {
                generation: self.state.generation,
            },
        })
    }

    fn stop(&mut self) -> Result<Toggle> {
        let elapsed = self.state.elapsed;
        let exit = self.revoke_and_join();
        self.cancel = CancelToken::new();
        self.state.running = false;
        self.state.reset_display();

        let finished = self.state.label.clone();
        tracing::info!(
            label = %finished,
            elapsed_secs = elapsed.as_secs(),
            exit_code = ?exit.and_then(|exit| exit.code),
            "recording stopped"
        );
        self.state.label = next_label_from(self.names.as_ref(), &self.extension)?;
        log_debug(&format!(
            "Recording stopped: {finished}; next output file: {}",
            self.state.label
        ));
        Ok(Toggle::Stopped { exit })
    }

    /// Advance the timer for the running session. Stray ticks are ignored.
    pub fn tick(&mut self, tick: Tick) -> TickOutcome {
        if !self.state.running || tick.generation != self.state.generation {
            return TickOutcome::Ignored;
        }
        self.state.elapsed += TICK_INTERVAL;
        self.state.frame_index = (self.state.frame_index + 1) % FRAME_COUNT;
        TickOutcome::Advanced { next: tick }
    }

    /// Quit path: stop an active recording and wait for it. The label and
    /// display state are left as they are.
    pub fn shutdown(&mut self) {
        if !self.state.running && self.task.is_none() {
            return;
        }
        log_debug("Shutting down active recording");
        let exit = self.revoke_and_join();
        tracing::info!(
            label = %self.state.label,
            elapsed_secs = self.state.elapsed.as_secs(),
            exit_code = ?exit.and_then(|exit| exit.code),
            "recording stopped on exit"
        );
        self.state.running = false;
    }

    /// Blocks until the recording task has returned.
    fn revoke_and_join(&mut self) -> Option<ProcessExit> {
        self.cancel.cancel();
        self.task.take().and_then(RecordingTask::join)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
