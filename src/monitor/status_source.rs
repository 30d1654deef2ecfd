//! Status source: reads the raw DRBD status text once per tick.
//!
//! Read failures never escape this module. They are folded into a synthetic
//! [`RawStatus`] so the dashboard keeps running and shows the cause.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::DEFAULT_STATUS_PATH;

/// Lines captured from one poll of the status interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawStatus {
    pub lines: Vec<String>,
    /// `true` when `lines` describe a read failure rather than real status.
    pub is_error: bool,
}

impl RawStatus {
    /// Build a status from raw file contents: trailing whitespace stripped,
    /// then split into lines.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.trim_end().lines().map(str::to_string).collect(),
            is_error: false,
        }
    }

    /// Synthetic two-line status describing a read failure.
    #[must_use]
    pub fn read_failure(path: &Path, error: &std::io::Error) -> Self {
        Self {
            lines: vec![
                format!("ERROR: {error}"),
                format!("Is DRBD loaded? Check {} exists", path.display()),
            ],
            is_error: true,
        }
    }

    /// All lines joined with single spaces, the form markers are matched against.
    #[must_use]
    pub fn joined(&self) -> String {
        self.lines.join(" ")
    }
}

/// Something that can be polled for DRBD status text.
pub trait StatusSource {
    /// Read the current status. Must not fail; errors become data.
    fn read(&mut self) -> RawStatus;

    /// Human-readable name of the source, shown in pane titles.
    fn describe(&self) -> String;
}

/// Production source backed by a file such as `/proc/drbd`.
#[derive(Debug, Clone)]
pub struct ProcStatusSource {
    path: PathBuf,
}

impl ProcStatusSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ProcStatusSource {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_PATH)
    }
}

impl StatusSource for ProcStatusSource {
    fn read(&mut self) -> RawStatus {
        match fs::read_to_string(&self.path) {
            Ok(text) => RawStatus::from_text(&text),
            Err(error) => RawStatus::read_failure(&self.path, &error),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use self::scripted::ScriptedStatusSource;

#[cfg(any(test, feature = "test-support"))]
mod scripted {
    use std::collections::VecDeque;
    use std::io;
    use std::path::Path;

    use super::{RawStatus, StatusSource};
    use crate::core::config::DEFAULT_STATUS_PATH;

    /// Deterministic source replaying canned status texts.
    ///
    /// Each `read` pops the next frame; the last frame repeats forever once the
    /// script is exhausted. `None` frames simulate a missing interface.
    #[derive(Debug, Clone)]
    pub struct ScriptedStatusSource {
        frames: VecDeque<Option<String>>,
        last: Option<Option<String>>,
        reads: usize,
    }

    impl ScriptedStatusSource {
        #[must_use]
        pub fn new<I, S>(frames: I) -> Self
        where
            I: IntoIterator<Item = Option<S>>,
            S: Into<String>,
        {
            Self {
                frames: frames.into_iter().map(|f| f.map(Into::into)).collect(),
                last: None,
                reads: 0,
            }
        }

        /// Number of polls served so far.
        #[must_use]
        pub const fn reads(&self) -> usize {
            self.reads
        }
    }

    impl StatusSource for ScriptedStatusSource {
        fn read(&mut self) -> RawStatus {
            self.reads += 1;
            if let Some(frame) = self.frames.pop_front() {
                self.last = Some(frame);
            }
            match self.last.as_ref() {
                Some(Some(text)) => RawStatus::from_text(text),
                Some(None) | None => RawStatus::read_failure(
                    Path::new(DEFAULT_STATUS_PATH),
                    &io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
                ),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }
}
