//! DRBD status monitoring: source reading, state classification, transition
//! history, per-tick snapshots.

pub mod classifier;
pub mod history;
pub mod snapshot;
pub mod status_source;
