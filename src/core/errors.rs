//! DSM-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Top-level error type for the DRBD sync monitor.
///
/// Status-source failures are deliberately absent: an unreadable status
/// interface is rendered as data, never raised.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("[DSM-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DSM-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[DSM-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[DSM-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DSM-4001] terminal acquisition failed: {source}")]
    TerminalAcquire {
        #[source]
        source: std::io::Error,
    },

    #[error("[DSM-4002] dashboard render failure during {stage}: {source}")]
    Render {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl MonitorError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DSM-1001",
            Self::ConfigParse { .. } => "DSM-1003",
            Self::Serialization { .. } => "DSM-2101",
            Self::Io { .. } => "DSM-3002",
            Self::TerminalAcquire { .. } => "DSM-4001",
            Self::Render { .. } => "DSM-4002",
        }
    }

    /// Whether this failure came from the rendering surface and must stop the
    /// dashboard loop.
    #[must_use]
    pub const fn is_terminal_fault(&self) -> bool {
        matches!(self, Self::TerminalAcquire { .. } | Self::Render { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for render failures at a named stage.
    #[must_use]
    pub const fn render(stage: &'static str, source: std::io::Error) -> Self {
        Self::Render { stage, source }
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}
