//! Production entrypoint for the live dashboard.

#![allow(missing_docs)]

use std::io;

use crate::core::config::MonitorConfig;
use crate::lifecycle::controller::LifecycleController;
use crate::lifecycle::session::{MonitorOutcome, run_session};
use crate::lifecycle::signals::SignalHandler;
use crate::logger::jsonl::JsonlWriter;
use crate::monitor::status_source::ProcStatusSource;
use crate::tui::terminal::CrosstermTerminal;

/// Watch `config.status_path` on the real terminal until sync completes or
/// the operator interrupts, then print the final report on stdout.
///
/// Never returns an error: terminal failures are carried in the outcome's
/// stop reason so the caller can still pick the exit code.
pub fn run_dashboard(config: &MonitorConfig) -> MonitorOutcome {
    let signals = SignalHandler::new();
    let log = JsonlWriter::from_optional_path(config.event_log.as_deref());
    let source = ProcStatusSource::new(config.status_path.clone());
    let mut controller = LifecycleController::new(source, config, log);

    let acquire_signals = signals.clone();
    let mut stdout = io::stdout();
    run_session(
        &mut controller,
        move || CrosstermTerminal::acquire(acquire_signals),
        &signals,
        &mut stdout,
    )
}
