//! Terminal dashboard: frame layout and composition, the rendering-surface
//! seam, and the plain-text final report.
//!
//! Layout, composition and the report are pure and always built; the
//! crossterm-backed pieces sit behind the `tui` feature.

#![allow(missing_docs)]

#[cfg(feature = "tui")]
pub mod input;
pub mod layout;
pub mod render;
pub mod report;
#[cfg(feature = "tui")]
pub mod runtime;
pub mod terminal;
#[cfg(feature = "tui")]
pub mod terminal_guard;

#[cfg(feature = "tui")]
pub use runtime::run_dashboard;
