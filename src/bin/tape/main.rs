//! Tape entrypoint: a cassette on screen, a screen recorder behind it.
//!
//! Enter or Space starts `wf-recorder` writing the next free name (`A.mkv`,
//! `B.mkv`, ...) and stops it again with SIGINT; `q` quits.

use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::io::{self, Write};
use tape::config::AppConfig;
use tape::doctor::doctor_report;
use tape::recorder::SystemRecorder;
use tape::sequencer::{next_label_from, DirectoryNames};
use tape::session::Session;
use tape::{init_logging, log_debug, log_file_path, ui, App};

fn main() -> Result<()> {
    run_with_args(std::env::args_os())
}

fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut config = AppConfig::parse_from(args);
    if config.doctor {
        println!("{}", doctor_report(&config).render());
        return Ok(());
    }

    config.validate()?;
    let names = DirectoryNames::new(&config.output_dir);

    if config.next_label {
        let label = next_label_from(&names, &config.extension)?;
        let mut stdout = io::stdout();
        writeln!(stdout, "{label}")?;
        return Ok(());
    }

    init_logging(&config);
    log_debug("=== Tape Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));
    log_debug(&format!(
        "Output dir: {} (extension {})",
        config.output_dir.display(),
        config.extension
    ));

    let recorder = SystemRecorder::new(config.recorder_spec());
    let session = Session::new(Box::new(recorder), Box::new(names), config.extension.clone())?;
    let mut app = App::new(session);
    let result = ui::run_app(&mut app);
    log_debug("=== Tape Exiting ===");
    result
}
