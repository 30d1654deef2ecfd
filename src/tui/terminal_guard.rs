//! RAII terminal lifecycle guard backed by crossterm.
//!
//! [`TerminalGuard`] enters raw mode, the alternate screen and hides the cursor
//! on construction, and restores all three on [`TerminalGuard::release`] or
//! [`Drop`], whichever comes first, including early error returns. A panic
//! hook restores the terminal *before* the panic message is printed, so the
//! message and the final report land on a normal screen.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};

/// Global flag indicating raw mode is active. Checked by the panic hook to
/// decide whether terminal restoration is needed.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// RAII guard owning the dashboard's terminal modes.
pub struct TerminalGuard {
    /// Whether we installed a custom panic hook (so drop knows to remove it).
    hook_installed: bool,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen, hide the cursor, and install a
    /// panic-safe cleanup hook.
    ///
    /// # Errors
    /// Returns I/O errors if terminal setup fails. On partial failure whatever
    /// was set up is restored before returning.
    pub fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);

        // From here on, dropping `guard` undoes partial setup.
        let mut guard = Self {
            hook_installed: false,
        };
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;

        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));
        guard.hook_installed = true;

        Ok(guard)
    }

    /// Restore the terminal now. Idempotent; `Drop` calls it again harmlessly.
    pub fn release(&mut self) {
        restore_terminal_best_effort();
    }

    /// Whether the guard still holds the terminal in dashboard mode.
    #[must_use]
    pub fn is_active() -> bool {
        RAW_MODE_ACTIVE.load(Ordering::SeqCst)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_best_effort();

        if self.hook_installed {
            // The previous hook was moved into our closure; reset to default.
            // The guard's lifetime brackets all dashboard usage.
            let _ = panic::take_hook();
        }
    }
}

/// Best-effort terminal restoration. Safe to call multiple times; uses the
/// atomic flag to avoid redundant work.
fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show, LeaveAlternateScreen);
        let _ = stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_terminal_is_idempotent() {
        restore_terminal_best_effort();
        restore_terminal_best_effort();
        assert!(!TerminalGuard::is_active());
    }

    #[test]
    fn flag_round_trip_without_terminal() {
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        assert!(TerminalGuard::is_active());

        restore_terminal_best_effort();
        assert!(!TerminalGuard::is_active());
    }
}
