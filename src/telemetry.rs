//! Session lifecycle events as JSON lines.

use crate::log_debug;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Once;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: Once = Once::new();

/// `TAPE_TRACE_LOG`, or `tape_trace.jsonl` in the temp dir.
pub fn tracing_log_path() -> PathBuf {
    env::var_os("TAPE_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("tape_trace.jsonl"))
}

/// Install the global JSON subscriber. Only the first enabled call has an effect.
pub(crate) fn init_tracing(enabled: bool) {
    if !enabled {
        return;
    }
    TRACING_INIT.call_once(|| {
        let path = tracing_log_path();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(err) => {
                log_debug(&format!("trace log {} unavailable: {err}", path.display()));
                return;
            }
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_target(false)
            .with_writer(file)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        match tracing::subscriber::set_global_default(subscriber) {
            Ok(()) => log_debug(&format!("Trace log: {}", path.display())),
            Err(err) => log_debug(&format!("trace subscriber not installed: {err}")),
        }
    });
}
