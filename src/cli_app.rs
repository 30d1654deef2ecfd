//! Top-level CLI definition and dispatch.

use clap::Parser;
use thiserror::Error;

use drbd_sync_monitor::core::config::MonitorConfig;
use drbd_sync_monitor::core::errors::MonitorError;
use drbd_sync_monitor::lifecycle::controller::StopReason;
use drbd_sync_monitor::tui::run_dashboard;

/// Live DRBD replication monitor. Watches /proc/drbd until every resource is
/// fully synchronized, then prints a final report.
///
/// Environment overrides: DSM_STATUS_PATH, DSM_REFRESH_INTERVAL_MS,
/// DSM_COMPLETION_HOLD_MS, DSM_EVENT_LOG.
#[derive(Debug, Parser)]
#[command(name = "drbd-monitor", author, version)]
pub struct Cli {}

/// Failures that happen before the dashboard starts.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Monitor(_) => 1,
        }
    }
}

/// Run the monitor and return the process exit code.
pub fn run(_cli: &Cli) -> Result<i32, CliError> {
    let config = MonitorConfig::load()?;
    let outcome = run_dashboard(&config);

    // The terminal is restored by now, so stderr is safe to use again.
    match &outcome.reason {
        StopReason::TerminalFault(error) => eprintln!("drbd-monitor: {error}"),
        StopReason::Panicked(message) => eprintln!("drbd-monitor: internal error: {message}"),
        StopReason::SyncComplete | StopReason::Interrupted => {}
    }
    Ok(outcome.exit_code())
}
