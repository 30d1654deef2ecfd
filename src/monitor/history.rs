//! Bounded state-change history: records transitions, not polls.

#![allow(missing_docs)]

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::config::HISTORY_CAPACITY;

/// Display format shared by history lines, headers and the final report.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl HistoryEntry {
    /// `[YYYY-mm-dd HH:MM:SS] message`
    #[must_use]
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.at.format(TIMESTAMP_FORMAT), self.message)
    }
}

/// Fixed-capacity FIFO of transitions. Consecutive duplicate messages are
/// suppressed; the oldest entry is evicted once capacity is exceeded.
#[derive(Debug, Clone)]
pub struct HistoryTracker {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Tracker with a custom bound. A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `message` unless it equals the last recorded message.
    /// Returns whether an entry was added.
    pub fn record(&mut self, at: DateTime<Local>, message: &str) -> bool {
        if self.last_message() == Some(message) {
            return false;
        }
        self.entries.push_back(HistoryEntry {
            at,
            message: message.to_string(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.entries.back().map(|e| e.message.as_str())
    }

    /// Owned copy of every retained entry, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryTracker {
    fn default() -> Self {
        Self::new()
    }
}
