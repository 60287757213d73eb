pub mod config;
pub mod doctor;
pub mod recorder;
pub mod sequencer;
pub mod session;
mod telemetry;
pub mod terminal;
pub mod ui;
pub mod view;

mod app;

pub use app::*;
pub use telemetry::tracing_log_path;
