//! Signal handling: SIGINT/SIGTERM request a graceful shutdown.
//!
//! Uses the `signal-hook` crate for safe signal registration. The handler only
//! flips an atomic flag; the tick loop polls it between ticks and while waiting,
//! so an interrupt always leaves through the teardown-then-report path.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown flag shared between OS signal hooks and the tick loop.
#[derive(Clone, Debug)]
pub struct SignalHandler {
    shutdown_flag: Arc<AtomicBool>,
}

impl SignalHandler {
    /// Create a handler and register SIGINT/SIGTERM hooks.
    ///
    /// Registration is best-effort: a failed hook leaves keyboard interruption
    /// (handled by the dashboard input layer) as the fallback.
    pub fn new() -> Self {
        let handler = Self::detached();
        handler.register_signals();
        handler
    }

    /// Handler with no OS hooks attached; only [`Self::request_shutdown`]
    /// can trip it.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check whether a shutdown has been requested.
    pub fn should_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::Relaxed)
    }

    /// Programmatically request shutdown.
    pub fn request_shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::Relaxed);
    }

    #[cfg(feature = "signals")]
    fn register_signals(&self) {
        use signal_hook::consts::{SIGINT, SIGTERM};

        // Errors are swallowed: stderr belongs to the dashboard once it starts.
        let _ = signal_hook::flag::register(SIGTERM, Arc::clone(&self.shutdown_flag));
        let _ = signal_hook::flag::register(SIGINT, Arc::clone(&self.shutdown_flag));
    }

    #[cfg(not(feature = "signals"))]
    fn register_signals(&self) {}
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
