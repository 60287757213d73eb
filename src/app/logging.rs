//! Debug and crash logs under the temp dir. Both are off unless `--logs`.

use crate::config::AppConfig;
use std::{
    env, fs, io,
    io::Write,
    panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: Mutex<Option<CappedFile>> = Mutex::new(None);

pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("tape_tui.log")
}

pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("tape_crash.log")
}

/// Append-only file that starts over once it would grow past `max_bytes`.
struct CappedFile {
    path: PathBuf,
    file: fs::File,
    len: u64,
    max_bytes: u64,
}

impl CappedFile {
    /// Files already over the cap are discarded.
    fn open(path: PathBuf, max_bytes: u64) -> io::Result<Self> {
        let existing = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
        let (file, len) = if existing > max_bytes {
            (Self::create(&path)?, 0)
        } else {
            let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
            (file, existing)
        };
        Ok(Self {
            path,
            file,
            len,
            max_bytes,
        })
    }

    fn create(path: &Path) -> io::Result<fs::File> {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
    }

    fn append(&mut self, line: &str) {
        let size = line.len() as u64;
        if self.len.saturating_add(size) > self.max_bytes {
            if let Ok(file) = Self::create(&self.path) {
                self.file = file;
                self.len = 0;
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(size);
        }
    }
}

fn stamped(msg: &str) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("[{secs}] {msg}\n")
}

fn set_enabled(enabled: bool) {
    let mut log = DEBUG_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *log = if enabled {
        CappedFile::open(log_file_path(), LOG_MAX_BYTES).ok()
    } else {
        None
    };
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Turn on the debug log, crash log and JSON trace when the flags allow it.
pub fn init_logging(config: &AppConfig) {
    let enabled = config.logging_enabled();
    set_enabled(enabled);
    crate::telemetry::init_tracing(enabled);
}

/// Never written to the terminal; the TUI owns it.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let line = stamped(msg);
    let mut log = DEBUG_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(file) = log.as_mut() {
        file.append(&line);
    }
}

/// One line per panic: location, message and version.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    let line = stamped(&format!(
        "panic at {location}: {payload} (v{})",
        env!("CARGO_PKG_VERSION")
    ));
    if let Ok(mut file) = CappedFile::open(crash_log_path(), CRASH_LOG_MAX_BYTES) {
        file.append(&line);
    }
}

#[cfg(test)]
pub(crate) fn set_logging_for_tests(enabled: bool) {
    set_enabled(enabled);
}
