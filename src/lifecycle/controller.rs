//! Lifecycle controller: owns the poll → classify → record → snapshot → render
//! loop, the history buffer and the last-snapshot slot.
//!
//! State machine: `Running` → `Stopped` on sync completion, interruption, or a
//! terminal fault. Nothing else touches the history or the snapshot, so no
//! locking is involved.

#![allow(missing_docs)]

use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;

use crate::core::config::MonitorConfig;
use crate::core::errors::{MonitorError, Result};
use crate::lifecycle::signals::SignalHandler;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};
use crate::monitor::classifier::{ReplicationState, classify};
use crate::monitor::history::HistoryTracker;
use crate::monitor::snapshot::DashboardSnapshot;
use crate::monitor::status_source::StatusSource;
use crate::tui::layout::FramePlan;
use crate::tui::render::Frame;
use crate::tui::terminal::{DashboardTerminal, WaitOutcome};

/// Controller run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Why the tick loop stopped.
#[derive(Debug)]
pub enum StopReason {
    /// Classifier reported `DONE`.
    SyncComplete,
    /// Keyboard quit or SIGINT/SIGTERM.
    Interrupted,
    /// The terminal could not be acquired, queried, or drawn.
    TerminalFault(MonitorError),
    /// A bug unwound out of the loop; carries the panic message.
    Panicked(String),
}

impl StopReason {
    /// Process exit status for this reason.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::SyncComplete | Self::Interrupted => 0,
            Self::TerminalFault(_) | Self::Panicked(_) => 1,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SyncComplete => "sync_complete",
            Self::Interrupted => "interrupted",
            Self::TerminalFault(_) => "terminal_fault",
            Self::Panicked(_) => "panicked",
        }
    }
}

pub struct LifecycleController<S> {
    source: S,
    source_name: String,
    refresh: Duration,
    hold: Duration,
    history: HistoryTracker,
    last_snapshot: Option<DashboardSnapshot>,
    last_state: Option<ReplicationState>,
    source_failing: bool,
    run_state: RunState,
    ticks: u64,
    log: JsonlWriter,
}

impl<S: StatusSource> LifecycleController<S> {
    #[must_use]
    pub fn new(source: S, config: &MonitorConfig, log: JsonlWriter) -> Self {
        let source_name = source.describe();
        Self {
            source,
            source_name,
            refresh: config.refresh_interval(),
            hold: config.completion_hold(),
            history: HistoryTracker::new(),
            last_snapshot: None,
            last_state: None,
            source_failing: false,
            run_state: RunState::Running,
            ticks: 0,
            log,
        }
    }

    /// Poll once: read, classify, record the transition, store the snapshot.
    ///
    /// The snapshot is stored before anything is drawn so a later render
    /// failure still leaves this tick available to the final report.
    pub fn tick(&mut self) -> &DashboardSnapshot {
        let now = Local::now();
        let raw = self.source.read();
        let classification = classify(&raw);

        if raw.is_error && !self.source_failing {
            self.log.write_entry(
                &LogEntry::new(EventType::SourceError, Severity::Warning)
                    .with_details(raw.lines.join(" | ")),
            );
        }
        self.source_failing = raw.is_error;

        if self.history.record(now, &classification.message) {
            self.log.write_entry(
                &LogEntry::new(EventType::StateChange, Severity::Info)
                    .with_state(classification.state, &classification.message),
            );
        }
        self.last_state = Some(classification.state);
        self.ticks += 1;

        let snapshot = DashboardSnapshot::new(
            now,
            self.source_name.clone(),
            raw,
            classification,
            self.history.snapshot(),
        );
        self.last_snapshot.insert(snapshot)
    }

    /// Run ticks until sync completes, the operator interrupts, or the
    /// terminal fails. Does not release the terminal; the session does.
    pub fn run<T: DashboardTerminal>(
        &mut self,
        terminal: &mut T,
        signals: &SignalHandler,
    ) -> StopReason {
        self.run_state = RunState::Running;
        self.log.write_entry(
            &LogEntry::new(EventType::MonitorStart, Severity::Info)
                .with_details(self.source_name.clone()),
        );
        let reason = self.run_loop(terminal, signals);
        self.run_state = RunState::Stopped;
        reason
    }

    fn run_loop<T: DashboardTerminal>(
        &mut self,
        terminal: &mut T,
        signals: &SignalHandler,
    ) -> StopReason {
        loop {
            if signals.should_shutdown() {
                return StopReason::Interrupted;
            }

            let state = self.tick().state;

            if let Err(error) = self.render(terminal) {
                return StopReason::TerminalFault(error);
            }

            if state.is_terminal() {
                self.hold_final_frame(terminal);
                return StopReason::SyncComplete;
            }

            match terminal.wait(self.refresh) {
                Ok(WaitOutcome::Interrupted) => return StopReason::Interrupted,
                Ok(WaitOutcome::Elapsed | WaitOutcome::Refresh) => {}
                Err(source) => {
                    return StopReason::TerminalFault(MonitorError::render("input wait", source));
                }
            }
        }
    }

    /// Keep the completed frame on screen for the full hold. Keys, resizes
    /// and input errors during the hold only end the input watch early; the
    /// rest of the hold is slept off.
    fn hold_final_frame<T: DashboardTerminal>(&self, terminal: &mut T) {
        let started = Instant::now();
        match terminal.wait(self.hold) {
            Ok(WaitOutcome::Elapsed) => {}
            Ok(WaitOutcome::Refresh | WaitOutcome::Interrupted) | Err(_) => {
                thread::sleep(self.hold.saturating_sub(started.elapsed()));
            }
        }
    }

    fn render<T: DashboardTerminal>(&self, terminal: &mut T) -> Result<()> {
        let Some(snapshot) = self.last_snapshot.as_ref() else {
            return Ok(());
        };
        let (cols, rows) = terminal
            .size()
            .map_err(|source| MonitorError::render("size query", source))?;
        let frame = Frame::compose(snapshot, &FramePlan::compute(cols, rows));
        terminal
            .draw(&frame)
            .map_err(|source| MonitorError::render("draw", source))
    }

    /// Mark the loop stopped and log why. Called once by the session after
    /// the terminal is released.
    pub(crate) fn finish(&mut self, reason: &StopReason) {
        self.run_state = RunState::Stopped;

        let entry = match reason {
            StopReason::SyncComplete => {
                let msg = self.last_snapshot.as_ref().map_or("", |s| s.message.as_str());
                LogEntry::new(EventType::SyncComplete, Severity::Info)
                    .with_state(ReplicationState::Done, msg)
            }
            StopReason::Interrupted => LogEntry::new(EventType::Interrupted, Severity::Info),
            StopReason::TerminalFault(error) => {
                LogEntry::new(EventType::TerminalFault, Severity::Critical).with_error(error)
            }
            StopReason::Panicked(message) => {
                LogEntry::new(EventType::TerminalFault, Severity::Critical)
                    .with_details(format!("panic: {message}"))
            }
        };
        self.log.write_entry(&entry);
        self.log.write_entry(
            &LogEntry::new(EventType::MonitorStop, Severity::Info)
                .with_details(format!("{} after {} ticks", reason.label(), self.ticks)),
        );
    }

    #[must_use]
    pub fn last_snapshot(&self) -> Option<&DashboardSnapshot> {
        self.last_snapshot.as_ref()
    }

    #[must_use]
    pub fn last_state(&self) -> Option<ReplicationState> {
        self.last_state
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryTracker {
        &self.history
    }

    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }
}
