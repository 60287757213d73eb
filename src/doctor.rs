use crate::config::AppConfig;
use crate::sequencer::{next_label_from, DirectoryNames};
use crate::telemetry::tracing_log_path;
use crate::{crash_log_path, log_file_path};
use crossterm::terminal::size as terminal_size;
use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
};

pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    pub fn new(title: &str) -> Self {
        Self {
            lines: vec![title.to_string()],
        }
    }

    pub fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("{title}:"));
    }

    pub fn push_kv(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("  {key}: {value}"));
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Environment and configuration summary for `--doctor`. Never fails; problems
/// are reported inline.
pub fn doctor_report(config: &AppConfig) -> DoctorReport {
    let mut report = DoctorReport::new("Tape Doctor");
    report.push_kv("version", env!("CARGO_PKG_VERSION"));
    report.push_kv(
        "os",
        format!("{}/{}", env::consts::OS, env::consts::ARCH),
    );

    let mut validated = config.clone();
    let validation_result = validated.validate();
    let resolved = validation_result
        .as_ref()
        .map(|_| &validated)
        .unwrap_or(config);

    report.section("Terminal");
    match terminal_size() {
        Ok((cols, rows)) => report.push_kv("size", format!("{cols}x{rows}")),
        Err(err) => report.push_kv("size", format!("error: {err}")),
    }
    if let Ok(term) = env::var("TERM") {
        report.push_kv("term", term);
    }
    if env::var("NO_COLOR").is_ok() {
        report.push_kv("no_color", "set");
    }

    report.section("Config");
    match &validation_result {
        Ok(()) => report.push_kv("validation", "ok"),
        Err(err) => report.push_kv("validation", format!("error: {err:#}")),
    }
    report.push_kv(
        "logs",
        if resolved.logging_enabled() {
            "enabled"
        } else {
            "disabled"
        },
    );
    report.push_kv("log_file", log_file_path().display());
    report.push_kv("crash_log", crash_log_path().display());
    report.push_kv("trace_log", tracing_log_path().display());
    report.push_kv("output_dir", resolved.output_dir.display());
    report.push_kv("extension", &resolved.extension);
    let next = next_label_from(&DirectoryNames::new(&resolved.output_dir), &resolved.extension);
    match &next {
        Ok(label) => report.push_kv("next_label", label),
        Err(err) => report.push_kv("next_label", format!("error: {err:#}")),
    }

    report.section("Recorder");
    report.push_kv("command", &resolved.recorder_cmd);
    report.push_kv(
        "resolved_path",
        resolve_on_path(&resolved.recorder_cmd)
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "not found".to_string()),
    );
    if let Ok(label) = &next {
        report.push_kv("invocation", resolved.recorder_spec().command_line(label));
    }

    report
}

/// Locate `command` the way the shell would: paths are taken as-is, bare names
/// are searched in `PATH`.
fn resolve_on_path(command: &str) -> Option<PathBuf> {
    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|path| path.is_file())
}
