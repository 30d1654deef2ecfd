#![forbid(unsafe_code)]

//! DRBD sync monitor: live terminal dashboard for DRBD replication.
//!
//! Polls the kernel's `/proc/drbd` status once per second, classifies it into
//! a replication state, keeps a short history of state changes, and exits on
//! its own once every resource is connected, up to date on both sides, and has
//! no out-of-sync blocks. A plain-text report is always printed after the
//! terminal is restored.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use drbd_sync_monitor::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use drbd_sync_monitor::monitor::classifier::classify;
//! use drbd_sync_monitor::monitor::status_source::RawStatus;
//!
//! let state = classify(&RawStatus::from_text("0: cs:WFConnection ro:Primary/Unknown")).state;
//! assert_eq!(state.label(), "WAITING_SECONDARY");
//! ```

pub mod prelude;

pub mod core;
pub mod lifecycle;
pub mod logger;
pub mod monitor;
pub mod tui;
