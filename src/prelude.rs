//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use drbd_sync_monitor::prelude::*;
//! ```

// Core
pub use crate::core::config::MonitorConfig;
pub use crate::core::errors::{MonitorError, Result};

// Monitor
pub use crate::monitor::classifier::{Classification, ReplicationState, classify};
pub use crate::monitor::history::{HistoryEntry, HistoryTracker};
pub use crate::monitor::snapshot::DashboardSnapshot;
pub use crate::monitor::status_source::{ProcStatusSource, RawStatus, StatusSource};

// Lifecycle
pub use crate::lifecycle::controller::{LifecycleController, RunState, StopReason};
pub use crate::lifecycle::session::{MonitorOutcome, run_session};
pub use crate::lifecycle::signals::SignalHandler;

// Logger
pub use crate::logger::jsonl::{JsonlConfig, JsonlWriter};

// Dashboard
pub use crate::tui::report::write_final_report;
pub use crate::tui::terminal::{DashboardTerminal, WaitOutcome};
#[cfg(feature = "tui")]
pub use crate::tui::terminal::CrosstermTerminal;
