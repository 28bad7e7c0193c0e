//! Error types for memscan operations.
//!
//! All errors are explicit and typed. Per-directory failures are folded into
//! [`crate::report::DirOutcome`] at the point of detection; these errors only
//! surface where an operation genuinely cannot continue.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for memscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for memscan operations.
#[derive(Debug, Error)]
pub enum Error {
    // Process errors
    #[error("command not found: {cmd}")]
    CommandNotFound { cmd: String },

    #[error("failed to spawn '{cmd}': {reason}")]
    CommandSpawnFailed { cmd: String, reason: String },

    #[error("command timed out after {timeout_secs}s: {cmd}")]
    CommandTimeout { cmd: String, timeout_secs: u64 },

    // File errors
    #[error("failed to write report '{path}': {reason}")]
    ReportWriteFailed { path: PathBuf, reason: String },

    // Configuration errors
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Generic I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a report write error.
    pub fn report_write_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ReportWriteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a spawn error.
    pub fn command_spawn_failed(cmd: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommandSpawnFailed {
            cmd: cmd.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
