//! Event handling for the tape screen.
//!
//! [`App`] turns terminal events and timer ticks into [`Session`](crate::session::Session)
//! transitions and keeps the viewport the view is rendered into.

mod logging;
mod state;

#[cfg(test)]
pub(crate) use logging::set_logging_for_tests;
pub use logging::{crash_log_path, init_logging, log_debug, log_file_path, log_panic};
pub(crate) use state::HINT_ROWS;
pub use state::{action_for_key, Action, App};
