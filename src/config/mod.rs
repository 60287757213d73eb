//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;

use crate::recorder::RecorderSpec;
pub use defaults::{
    DEFAULT_CODEC, DEFAULT_CRF, DEFAULT_EXTENSION, DEFAULT_OUTPUT_DIR, DEFAULT_RECORDER_CMD,
    MAX_CRF,
};

/// CLI options for Tape. Validated values keep the recorder invocation safe.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "tape",
    about = "Tape: toggle a screen recording from the terminal",
    author,
    version
)]
pub struct AppConfig {
    /// Screen recorder binary (name or absolute path)
    #[arg(
        long = "recorder-cmd",
        env = "TAPE_RECORDER_CMD",
        default_value = DEFAULT_RECORDER_CMD
    )]
    pub recorder_cmd: String,

    /// Video codec passed to the recorder
    #[arg(long, default_value = DEFAULT_CODEC)]
    pub codec: String,

    /// Constant rate factor for the codec (lower means higher quality)
    #[arg(long, default_value_t = DEFAULT_CRF)]
    pub crf: u8,

    /// Extension appended to every recording
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Directory that receives the recordings
    #[arg(long = "dir", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Print the next output file name and exit
    #[arg(long = "next-label", default_value_t = false)]
    pub next_label: bool,

    /// Print environment diagnostics and exit
    #[arg(long = "doctor", default_value_t = false)]
    pub doctor: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "TAPE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "TAPE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

impl AppConfig {
    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }

    /// Recorder invocation derived from the CLI values.
    pub fn recorder_spec(&self) -> RecorderSpec {
        RecorderSpec {
            command: self.recorder_cmd.clone(),
            codec: self.codec.clone(),
            crf: self.crf,
            working_dir: self.output_dir.clone(),
        }
    }
}
