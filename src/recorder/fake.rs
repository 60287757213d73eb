//! In-memory recorder used by the controller and task tests.

use super::{ProcessExit, Recorder, RecorderProcess};
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Counters shared by every process a [`FakeRecorder`] launches.
#[derive(Default)]
pub(crate) struct RecorderLog {
    pub(crate) launches: Mutex<Vec<String>>,
    pub(crate) live: AtomicUsize,
    pub(crate) max_live: AtomicUsize,
    pub(crate) interrupts: AtomicUsize,
    pub(crate) exits: AtomicUsize,
}

impl RecorderLog {
    pub(crate) fn launched(&self) -> Vec<String> {
        self.launches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub(crate) fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub(crate) fn interrupts(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    pub(crate) fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeRecorder {
    pub(crate) log: Arc<RecorderLog>,
    fail_launch: bool,
    exit_immediately: bool,
    poll_fails: bool,
    exit_delay: Duration,
    output_dir: Option<Arc<Mutex<HashSet<String>>>>,
}

impl FakeRecorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every launch fails as if the binary were missing.
    pub(crate) fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    /// Processes die right away with exit code 1.
    pub(crate) fn crashing() -> Self {
        Self {
            exit_immediately: true,
            ..Self::default()
        }
    }

    /// Processes that cannot be polled; `try_wait` always errors.
    pub(crate) fn unpollable() -> Self {
        Self {
            poll_fails: true,
            ..Self::default()
        }
    }

    /// Processes take `delay` to finalize after SIGINT.
    pub(crate) fn with_exit_delay(mut self, delay: Duration) -> Self {
        self.exit_delay = delay;
        self
    }

    /// Launching adds the label to `names`, like a recorder creating its file.
    pub(crate) fn writing_into(mut self, names: Arc<Mutex<HashSet<String>>>) -> Self {
        self.output_dir = Some(names);
        self
    }
}

impl Recorder for FakeRecorder {
    fn launch(&self, label: &str) -> Result<Box<dyn RecorderProcess>> {
        if self.fail_launch {
            bail!("failed to launch recorder 'fake-recorder'");
        }
        self.log
            .launches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(label.to_string());
        let live = self.log.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_live.fetch_max(live, Ordering::SeqCst);
        if let Some(names) = &self.output_dir {
            names
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(label.to_string());
        }
        Ok(Box::new(FakeProcess {
            log: Arc::clone(&self.log),
            interrupted: Arc::new(AtomicBool::new(false)),
            exited: false,
            exit_immediately: self.exit_immediately,
            poll_fails: self.poll_fails,
            exit_delay: self.exit_delay,
        }))
    }
}

pub(crate) struct FakeProcess {
    log: Arc<RecorderLog>,
    interrupted: Arc<AtomicBool>,
    exited: bool,
    exit_immediately: bool,
    poll_fails: bool,
    exit_delay: Duration,
}

impl FakeProcess {
    fn finish(&mut self, code: i32) -> ProcessExit {
        if !self.exited {
            self.exited = true;
            self.log.live.fetch_sub(1, Ordering::SeqCst);
            self.log.exits.fetch_add(1, Ordering::SeqCst);
        }
        ProcessExit { code: Some(code) }
    }
}

impl RecorderProcess for FakeProcess {
    fn interrupt(&mut self) -> io::Result<()> {
        self.log.interrupts.fetch_add(1, Ordering::SeqCst);
        self.interrupted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn try_wait(&mut self) -> io::Result<Option<ProcessExit>> {
        if self.poll_fails {
            return Err(io::Error::other("waitpid failed"));
        }
        if self.exit_immediately {
            return Ok(Some(self.finish(1)));
        }
        Ok(None)
    }

    fn wait(&mut self) -> io::Result<ProcessExit> {
        while !self.interrupted.load(Ordering::SeqCst) && !self.exit_immediately {
            thread::sleep(Duration::from_millis(5));
        }
        thread::sleep(self.exit_delay);
        Ok(self.finish(0))
    }
}
