//! Per-tick dashboard snapshot, kept so shutdown can always report the last
//! completed tick even if rendering fails afterwards.

#![allow(missing_docs)]

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::monitor::classifier::{Classification, ReplicationState};
use crate::monitor::history::{HistoryEntry, TIMESTAMP_FORMAT};
use crate::monitor::status_source::RawStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub captured_at: DateTime<Local>,
    /// Name of the polled source, e.g. `/proc/drbd`.
    pub source: String,
    pub raw: RawStatus,
    pub state: ReplicationState,
    pub message: String,
    /// Full retained history at capture time, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl DashboardSnapshot {
    #[must_use]
    pub fn new(
        captured_at: DateTime<Local>,
        source: String,
        raw: RawStatus,
        classification: Classification,
        history: Vec<HistoryEntry>,
    ) -> Self {
        Self {
            captured_at,
            source,
            raw,
            state: classification.state,
            message: classification.message,
            history,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// The trailing `n` history entries, oldest first.
    #[must_use]
    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        &self.history[self.history.len().saturating_sub(n)..]
    }
}
