//! One monitoring session: acquire the terminal, run the tick loop, release
//! the terminal, then print the final report.
//!
//! Release always happens before the report is written, on every exit path:
//! completion, interruption, render faults, and panics unwinding out of the
//! loop.

#![allow(missing_docs)]

use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use crate::core::errors::Result;
use crate::lifecycle::controller::{LifecycleController, StopReason};
use crate::lifecycle::signals::SignalHandler;
use crate::monitor::snapshot::DashboardSnapshot;
use crate::monitor::status_source::StatusSource;
use crate::tui::report::write_final_report;
use crate::tui::terminal::DashboardTerminal;

/// Result of a finished session.
#[derive(Debug)]
pub struct MonitorOutcome {
    pub reason: StopReason,
    pub ticks: u64,
    /// Snapshot of the last completed tick, if any tick ran.
    pub final_snapshot: Option<DashboardSnapshot>,
    /// Whether the final report reached `out` intact.
    pub report_written: bool,
}

impl MonitorOutcome {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.reason.exit_code()
    }
}

/// Drive `controller` against the terminal produced by `acquire` and write the
/// final report to `out` once the terminal is restored.
///
/// When acquisition fails nothing was drawn, no tick ran, and no report is
/// written; the reason carries the acquisition error.
pub fn run_session<S, T, A, W>(
    controller: &mut LifecycleController<S>,
    acquire: A,
    signals: &SignalHandler,
    out: &mut W,
) -> MonitorOutcome
where
    S: StatusSource,
    T: DashboardTerminal,
    A: FnOnce() -> Result<T>,
    W: Write,
{
    let reason = match acquire() {
        Ok(mut terminal) => {
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| controller.run(&mut terminal, signals)));
            terminal.release();
            drop(terminal);
            match result {
                Ok(reason) => reason,
                Err(payload) => StopReason::Panicked(panic_message(payload.as_ref())),
            }
        }
        Err(error) => StopReason::TerminalFault(error),
    };

    let report_written = controller
        .last_snapshot()
        .is_some_and(|snapshot| write_final_report(out, snapshot).is_ok());

    controller.finish(&reason);

    MonitorOutcome {
        reason,
        ticks: controller.ticks(),
        final_snapshot: controller.last_snapshot().cloned(),
        report_written,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MonitorConfig;
    use crate::core::errors::MonitorError;
    use crate::logger::jsonl::JsonlWriter;
    use crate::monitor::classifier::ReplicationState;
    use crate::monitor::status_source::{RawStatus, ScriptedStatusSource};
    use crate::tui::terminal::{JournalEvent, JournalingWriter, RecordingTerminal};
    use std::io;

    const SYNCING: &str = "cs:SyncSource ds:UpToDate/Inconsistent\n\tresync:42%";
    const DONE: &str = "cs:Connected ds:UpToDate/UpToDate\n\tns:10 nr:0 oos:0";

    fn lend<'a>(
        term: &'a mut RecordingTerminal,
    ) -> impl FnOnce() -> Result<&'a mut RecordingTerminal> {
        move || Ok(term)
    }

    fn controller<I>(frames: I) -> LifecycleController<ScriptedStatusSource>
    where
        I: IntoIterator<Item = Option<&'static str>>,
    {
        LifecycleController::new(
            ScriptedStatusSource::new(frames),
            &MonitorConfig::default(),
            JsonlWriter::disabled(),
        )
    }

    fn assert_released_before_report(events: &[JournalEvent]) {
        let release = events.iter().position(|e| *e == JournalEvent::Release);
        let report = events.iter().position(|e| *e == JournalEvent::Report);
        assert!(release.is_some(), "terminal never released: {events:?}");
        assert!(report.is_some(), "report never written: {events:?}");
        assert!(release < report, "report written before release: {events:?}");
        assert_eq!(events.iter().filter(|e| **e == JournalEvent::Release).count(), 1);
    }

    #[test]
    fn completion_releases_then_reports() {
        let mut c = controller([Some(SYNCING), Some(DONE)]);
        let mut term = RecordingTerminal::new(100, 40);
        let mut out = JournalingWriter::new(term.journal());

        let outcome = run_session(&mut c, lend(&mut term), &SignalHandler::detached(), &mut out);

        assert!(matches!(outcome.reason, StopReason::SyncComplete));
        assert_eq!(outcome.exit_code(), 0);
        assert!(outcome.report_written);
        assert!(term.is_released());
        assert_released_before_report(&term.journal().borrow());

        let text = out.text();
        assert!(text.contains("FINAL DRBD STATUS"));
        assert!(text.contains("DRBD SYNC COMPLETE"));
    }

    #[test]
    fn interrupt_after_tick_releases_then_reports() {
        let mut c = controller([Some(SYNCING)]);
        let mut term = RecordingTerminal::new(80, 24).interrupt_after_waits(1);
        let mut out = JournalingWriter::new(term.journal());

        let outcome = run_session(&mut c, lend(&mut term), &SignalHandler::detached(), &mut out);

        assert!(matches!(outcome.reason, StopReason::Interrupted));
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.ticks, 2);
        assert_released_before_report(&term.journal().borrow());
        assert!(out.text().contains("42%"));
    }

    #[test]
    fn acquire_failure_reports_nothing() {
        let mut c = controller([Some(DONE)]);
        let mut out = Vec::new();
        let outcome = run_session(
            &mut c,
            || -> Result<RecordingTerminal> {
                Err(MonitorError::TerminalAcquire {
                    source: io::Error::other("not a tty"),
                })
            },
            &SignalHandler::detached(),
            &mut out,
        );

        assert!(matches!(outcome.reason, StopReason::TerminalFault(_)));
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(outcome.ticks, 0);
        assert!(!outcome.report_written);
        assert!(out.is_empty());
    }

    #[test]
    fn draw_fault_still_reports_last_snapshot() {
        let mut c = controller([Some(SYNCING)]);
        let mut term = RecordingTerminal::new(80, 24).fail_draw_at(0);
        let mut out = JournalingWriter::new(term.journal());

        let outcome = run_session(&mut c, lend(&mut term), &SignalHandler::detached(), &mut out);

        assert!(matches!(outcome.reason, StopReason::TerminalFault(_)));
        assert!(outcome.report_written);
        assert_released_before_report(&term.journal().borrow());
        assert!(out.text().contains("42%"));
    }

    struct PanickingSource {
        polls: u32,
    }

    impl StatusSource for PanickingSource {
        fn read(&mut self) -> RawStatus {
            self.polls += 1;
            assert!(self.polls < 2, "status source blew up");
            RawStatus::from_text(SYNCING)
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    #[test]
    fn panic_in_loop_still_releases_and_reports() {
        let mut c = LifecycleController::new(
            PanickingSource { polls: 0 },
            &MonitorConfig::default(),
            JsonlWriter::disabled(),
        );
        let mut term = RecordingTerminal::new(80, 24);
        let mut out = JournalingWriter::new(term.journal());

        let outcome = run_session(&mut c, lend(&mut term), &SignalHandler::detached(), &mut out);

        match &outcome.reason {
            StopReason::Panicked(msg) => assert!(msg.contains("blew up")),
            other => panic!("expected panic outcome, got {other:?}"),
        }
        assert_eq!(outcome.exit_code(), 1);
        assert!(outcome.report_written);
        assert_released_before_report(&term.journal().borrow());
        assert_eq!(outcome.final_snapshot.map(|s| s.state), Some(ReplicationState::Syncing));
    }

    #[test]
    fn interrupt_before_first_tick_skips_report() {
        let signals = SignalHandler::detached();
        signals.request_shutdown();
        let mut c = controller([Some(SYNCING)]);
        let mut term = RecordingTerminal::new(80, 24);
        let mut out = Vec::new();

        let outcome = run_session(&mut c, lend(&mut term), &signals, &mut out);

        assert!(matches!(outcome.reason, StopReason::Interrupted));
        assert!(term.is_released());
        assert!(!outcome.report_written);
        assert!(out.is_empty());
    }

    #[test]
    fn panic_message_handles_both_payload_kinds() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
