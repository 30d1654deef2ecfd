//! JSONL event log: append-only line-delimited JSON of monitor transitions.
//!
//! Each line is a self-contained JSON object assembled in memory and written
//! with a single `write_all`, so a concurrent `tail -f` never sees a partial
//! line. The dashboard owns stdout/stderr while it runs, so there is no console
//! fallback: on any I/O failure the writer degrades to silently discarding.
//! Logging must never stop the monitor.

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions, rename};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{MonitorError, Result};
use crate::monitor::classifier::ReplicationState;

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Monitor lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    MonitorStart,
    StateChange,
    SourceError,
    SyncComplete,
    Interrupted,
    TerminalFault,
    MonitorStop,
}

/// A single JSONL log entry. All fields optional except `ts`, `event`, `severity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// Replication state at the time of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ReplicationState>,
    /// Operator-facing status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// DSM error code when the event reports a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Freeform details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            state: None,
            message: None,
            error_code: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: ReplicationState, message: &str) -> Self {
        self.state = Some(state);
        self.message = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: &MonitorError) -> Self {
        self.error_code = Some(error.code().to_string());
        self.details = Some(error.to_string());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Encode as one newline-terminated JSONL line.
    pub fn to_json_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Degradation state of the JSONL writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Writing to the configured path.
    Normal,
    /// Disabled or failed; entries are dropped.
    Discard,
}

/// Configuration for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    /// Maximum file size before rotation (bytes). Default: 10 MiB.
    pub max_size_bytes: u64,
    /// Number of rotated files to keep. Default: 3.
    pub max_rotated_files: u32,
}

impl JsonlConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

/// Append-only JSONL writer with size-based rotation.
pub struct JsonlWriter {
    config: Option<JsonlConfig>,
    writer: Option<BufWriter<File>>,
    state: WriterState,
    bytes_written: u64,
}

impl JsonlWriter {
    /// Open the log file. Falls back to discarding on failure.
    pub fn open(config: JsonlConfig) -> Self {
        let mut w = Self {
            config: Some(config),
            writer: None,
            state: WriterState::Discard,
            bytes_written: 0,
        };
        w.try_open();
        w
    }

    /// Writer that drops every entry. Used when no event log is configured.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            config: None,
            writer: None,
            state: WriterState::Discard,
            bytes_written: 0,
        }
    }

    /// Open `path` when given, otherwise a disabled writer.
    pub fn from_optional_path(path: Option<&Path>) -> Self {
        path.map_or_else(Self::disabled, |p| Self::open(JsonlConfig::new(p)))
    }

    /// Write a single log entry as one JSONL line, flushed immediately.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        if self.state == WriterState::Discard {
            return;
        }
        let Ok(line) = entry.to_json_line() else {
            return;
        };
        self.write_line(&line);
    }

    /// Current degradation state.
    pub fn state(&self) -> &str {
        match self.state {
            WriterState::Normal => "normal",
            WriterState::Discard => "discard",
        }
    }

    /// Number of bytes written to the current file.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    // ──────────────────────── internals ────────────────────────

    fn write_line(&mut self, line: &str) {
        let max = self.config.as_ref().map_or(u64::MAX, |c| c.max_size_bytes);
        if self.bytes_written + line.len() as u64 > max && self.bytes_written > 0 {
            self.rotate();
        }

        let Some(w) = self.writer.as_mut() else {
            self.degrade();
            return;
        };
        if w.write_all(line.as_bytes()).and_then(|()| w.flush()).is_err() {
            self.degrade();
            return;
        }
        self.bytes_written += line.len() as u64;
    }

    fn try_open(&mut self) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        match open_append(&config.path) {
            Ok((file, size)) => {
                self.writer = Some(BufWriter::new(file));
                self.state = WriterState::Normal;
                self.bytes_written = size;
            }
            Err(_) => self.degrade(),
        }
    }

    fn degrade(&mut self) {
        self.writer = None;
        self.state = WriterState::Discard;
    }

    fn rotate(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
        }
        self.writer = None;

        let Some(config) = self.config.as_ref() else {
            return;
        };
        let base = config.path.clone();
        let keep = config.max_rotated_files;

        // .N is dropped, .N-1 → .N, …, current → .1
        if keep > 0 {
            let _ = fs::remove_file(rotated_name(&base, keep));
            for i in (1..keep).rev() {
                let _ = rename(rotated_name(&base, i), rotated_name(&base, i + 1));
            }
            let _ = rename(&base, rotated_name(&base, 1));
        } else {
            let _ = fs::remove_file(&base);
        }

        self.bytes_written = 0;
        self.try_open();
    }
}

// ──────────────────────── helpers ────────────────────────

/// Open or create a file for appending. Returns `(File, current_size)`.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| MonitorError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| MonitorError::io(path, source))?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// Build a rotated filename: `foo.jsonl` → `foo.jsonl.3`.
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
