//! Rendering-surface seam for the tick loop.
//!
//! The lifecycle controller only talks to [`DashboardTerminal`]. Production
//! uses the crossterm-backed terminal; tests use a recording terminal that
//! keeps a journal of every call so teardown ordering can be asserted.

#![allow(missing_docs)]

use std::io;
use std::time::Duration;

use crate::tui::render::Frame;

/// How a wait between ticks ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full duration passed.
    Elapsed,
    /// The operator asked for an immediate re-poll (key press or resize).
    Refresh,
    /// The operator or a signal asked the monitor to stop.
    Interrupted,
}

/// Everything the tick loop needs from a terminal.
pub trait DashboardTerminal {
    /// Current size as (columns, rows).
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Clear the screen and draw `frame`.
    fn draw(&mut self, frame: &Frame) -> io::Result<()>;

    /// Block for up to `timeout`, watching for interruption.
    fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome>;

    /// Restore the terminal to its normal state. Must be idempotent.
    fn release(&mut self);
}

impl<T: DashboardTerminal + ?Sized> DashboardTerminal for &mut T {
    fn size(&self) -> io::Result<(u16, u16)> {
        (**self).size()
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        (**self).draw(frame)
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        (**self).wait(timeout)
    }

    fn release(&mut self) {
        (**self).release();
    }
}

// ──────────────────── crossterm implementation ────────────────────

#[cfg(feature = "tui")]
pub use self::crossterm_impl::CrosstermTerminal;

#[cfg(feature = "tui")]
mod crossterm_impl {
    use std::io::{self, Write};
    use std::time::{Duration, Instant};

    use crossterm::cursor::MoveTo;
    use crossterm::event;
    use crossterm::queue;
    use crossterm::style::{Attribute, SetAttribute};
    use crossterm::terminal::{self, Clear, ClearType};

    use super::{DashboardTerminal, WaitOutcome};
    use crate::core::errors::{MonitorError, Result};
    use crate::lifecycle::signals::SignalHandler;
    use crate::tui::input::{InputAction, resolve_event};
    use crate::tui::render::{Frame, LineStyle};
    use crate::tui::terminal_guard::TerminalGuard;

    /// Longest stretch spent blocked in `event::poll` before re-checking the
    /// signal flag.
    const INPUT_POLL_SLICE: Duration = Duration::from_millis(50);

    /// Real terminal: alternate screen in raw mode, drawn with crossterm.
    pub struct CrosstermTerminal {
        guard: TerminalGuard,
        stdout: io::Stdout,
        signals: SignalHandler,
    }

    impl CrosstermTerminal {
        /// Take over the terminal.
        pub fn acquire(signals: SignalHandler) -> Result<Self> {
            let guard = TerminalGuard::acquire()
                .map_err(|source| MonitorError::TerminalAcquire { source })?;
            Ok(Self {
                guard,
                stdout: io::stdout(),
                signals,
            })
        }
    }

    impl DashboardTerminal for CrosstermTerminal {
        fn size(&self) -> io::Result<(u16, u16)> {
            terminal::size()
        }

        fn draw(&mut self, frame: &Frame) -> io::Result<()> {
            queue!(self.stdout, MoveTo(0, 0), Clear(ClearType::All))?;
            for line in &frame.lines {
                queue!(self.stdout, MoveTo(0, line.row))?;
                match line.style {
                    LineStyle::Plain => {}
                    LineStyle::Bold => queue!(self.stdout, SetAttribute(Attribute::Bold))?,
                    LineStyle::BoldUnderline => queue!(
                        self.stdout,
                        SetAttribute(Attribute::Bold),
                        SetAttribute(Attribute::Underlined)
                    )?,
                }
                write!(self.stdout, "{}", line.text)?;
                queue!(self.stdout, SetAttribute(Attribute::Reset))?;
            }
            self.stdout.flush()
        }

        fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
            let deadline = Instant::now() + timeout;
            loop {
                if self.signals.should_shutdown() {
                    return Ok(WaitOutcome::Interrupted);
                }
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Ok(WaitOutcome::Elapsed);
                }
                if event::poll(remaining.min(INPUT_POLL_SLICE))? {
                    match resolve_event(&event::read()?) {
                        Some(InputAction::Quit) => return Ok(WaitOutcome::Interrupted),
                        Some(InputAction::ForceRefresh) => return Ok(WaitOutcome::Refresh),
                        None => {}
                    }
                }
            }
        }

        fn release(&mut self) {
            self.guard.release();
        }
    }
}

// ──────────────────── recording implementation ────────────────────

#[cfg(any(test, feature = "test-support"))]
pub use self::recording::{Journal, JournalEvent, JournalingWriter, RecordingTerminal};

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::{self, Write};
    use std::rc::Rc;
    use std::time::Duration;

    use super::{DashboardTerminal, WaitOutcome};
    use crate::tui::render::Frame;

    /// One call observed by a [`RecordingTerminal`], or a report write seen by
    /// a [`JournalingWriter`] sharing the same journal.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum JournalEvent {
        Draw,
        Wait(Duration),
        Release,
        Report,
    }

    /// Shared, clonable call journal.
    pub type Journal = Rc<RefCell<Vec<JournalEvent>>>;

    /// In-memory terminal for deterministic tests. Waits return immediately
    /// with scripted outcomes (default [`WaitOutcome::Elapsed`]).
    #[derive(Debug)]
    pub struct RecordingTerminal {
        size: (u16, u16),
        frames: Vec<Frame>,
        wait_script: VecDeque<io::Result<WaitOutcome>>,
        fail_draw_at: Option<usize>,
        journal: Journal,
        released: bool,
    }

    impl RecordingTerminal {
        #[must_use]
        pub fn new(cols: u16, rows: u16) -> Self {
            Self {
                size: (cols, rows),
                frames: Vec::new(),
                wait_script: VecDeque::new(),
                fail_draw_at: None,
                journal: Rc::new(RefCell::new(Vec::new())),
                released: false,
            }
        }

        /// Queue the outcome of the next unscripted wait.
        #[must_use]
        pub fn then_wait(mut self, outcome: WaitOutcome) -> Self {
            self.wait_script.push_back(Ok(outcome));
            self
        }

        /// Make the next unscripted wait fail, as if input polling broke.
        #[must_use]
        pub fn then_wait_error(mut self) -> Self {
            self.wait_script
                .push_back(Err(io::Error::other("input poll failed")));
            self
        }

        /// Elapse `n` waits, then report interruption on the next one.
        #[must_use]
        pub fn interrupt_after_waits(mut self, n: usize) -> Self {
            for _ in 0..n {
                self.wait_script.push_back(Ok(WaitOutcome::Elapsed));
            }
            self.wait_script.push_back(Ok(WaitOutcome::Interrupted));
            self
        }

        /// Make the `index`-th draw (0-based) fail.
        #[must_use]
        pub fn fail_draw_at(mut self, index: usize) -> Self {
            self.fail_draw_at = Some(index);
            self
        }

        #[must_use]
        pub fn journal(&self) -> Journal {
            Rc::clone(&self.journal)
        }

        #[must_use]
        pub fn frames(&self) -> &[Frame] {
            &self.frames
        }

        #[must_use]
        pub fn is_released(&self) -> bool {
            self.released
        }

        /// Durations of every wait so far.
        #[must_use]
        pub fn waits(&self) -> Vec<Duration> {
            self.journal
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    JournalEvent::Wait(d) => Some(*d),
                    _ => None,
                })
                .collect()
        }
    }

    impl DashboardTerminal for RecordingTerminal {
        fn size(&self) -> io::Result<(u16, u16)> {
            Ok(self.size)
        }

        fn draw(&mut self, frame: &Frame) -> io::Result<()> {
            if self.fail_draw_at == Some(self.frames.len()) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal went away"));
            }
            self.journal.borrow_mut().push(JournalEvent::Draw);
            self.frames.push(frame.clone());
            Ok(())
        }

        fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
            self.journal.borrow_mut().push(JournalEvent::Wait(timeout));
            self.wait_script.pop_front().unwrap_or(Ok(WaitOutcome::Elapsed))
        }

        fn release(&mut self) {
            if !self.released {
                self.released = true;
                self.journal.borrow_mut().push(JournalEvent::Release);
            }
        }
    }

    /// Report sink that records [`JournalEvent::Report`] on its first write,
    /// so report output can be ordered against terminal calls.
    #[derive(Debug)]
    pub struct JournalingWriter {
        journal: Journal,
        buf: Vec<u8>,
    }

    impl JournalingWriter {
        #[must_use]
        pub fn new(journal: Journal) -> Self {
            Self {
                journal,
                buf: Vec::new(),
            }
        }

        /// Everything written so far, lossily decoded.
        #[must_use]
        pub fn text(&self) -> String {
            String::from_utf8_lossy(&self.buf).into_owned()
        }
    }

    impl Write for JournalingWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if self.buf.is_empty() && !data.is_empty() {
                self.journal.borrow_mut().push(JournalEvent::Report);
            }
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
