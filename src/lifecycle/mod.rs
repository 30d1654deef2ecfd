//! Process lifecycle: the tick loop, shutdown signals, and the session that
//! ties terminal teardown to the final report.

pub mod controller;
pub mod session;
pub mod signals;
