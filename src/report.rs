//! Per-directory outcomes and the aggregated scan report.
//!
//! Every qualifying directory ends in exactly one [`DirOutcome`]. Outcomes
//! render to the line-oriented stdout format as they are produced; the
//! collected [`ScanReport`] decides the process exit code once, at the end.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::error::{Error, Result};

/// Width of the right-aligned first column.
const COLUMN_WIDTH: usize = 10;

/// First-column text for a directory that could not be measured.
pub const ERROR_LABEL: &str = "ERROR";

/// Why a directory was not measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Hidden or vendored path
    Filtered,
    /// No `_test.go` files
    NoTests,
    /// Directory could not be listed
    Unreadable,
}

/// Result of processing one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DirOutcome {
    Skipped {
        reason: SkipReason,
    },
    MeasurementError {
        reason: String,
    },
    Measured {
        size: String,
        bytes: Option<u64>,
        /// Set when the threshold check was attempted but the size did not parse
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size_error: Option<String>,
    },
    Flagged {
        size: String,
        bytes: u64,
        limit_bytes: u64,
        /// `None` when the profile could not be read back
        profile_base64: Option<String>,
    },
}

impl DirOutcome {
    pub fn measurement_error(reason: impl Into<String>) -> Self {
        Self::MeasurementError {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Write this outcome in the stdout format. Skipped directories print
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn render<W: Write>(&self, path: &str, out: &mut W) -> io::Result<()> {
        match self {
            Self::Skipped { .. } => Ok(()),
            Self::MeasurementError { .. } => summary_line(out, ERROR_LABEL, path),
            Self::Measured {
                size, size_error, ..
            } => {
                summary_line(out, size, path)?;
                if let Some(err) = size_error {
                    writeln!(out, "Could not parse unit of size: {err}")?;
                }
                Ok(())
            }
            Self::Flagged {
                size,
                profile_base64,
                ..
            } => {
                summary_line(out, size, path)?;
                match profile_base64 {
                    Some(encoded) => {
                        writeln!(out, "Base64 encoding of pprof mem.out:\n {encoded}")
                    }
                    None => writeln!(out, "Could not read file mem.out"),
                }
            }
        }
    }
}

fn summary_line<W: Write>(out: &mut W, first: &str, path: &str) -> io::Result<()> {
    writeln!(out, "{first:>COLUMN_WIDTH$} {path}")
}

/// One visited directory and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirReport {
    pub path: String,
    pub outcome: DirOutcome,
}

/// Count of directories passed over, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub filtered: usize,
    pub no_tests: usize,
    pub unreadable: usize,
}

impl SkipCounts {
    fn record(&mut self, reason: SkipReason) {
        let slot = match reason {
            SkipReason::Filtered => &mut self.filtered,
            SkipReason::NoTests => &mut self.no_tests,
            SkipReason::Unreadable => &mut self.unreadable,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Everything a scan found, in walk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub root: PathBuf,
    /// `0` when no limit was set
    pub limit_bytes: u64,
    /// Every visited directory, skipped ones included
    pub directories: Vec<DirReport>,
    pub skipped: SkipCounts,
    pub walk_errors: usize,
}

impl ScanReport {
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            root: config.root().clone(),
            limit_bytes: config.limit_bytes(),
            directories: Vec::new(),
            skipped: SkipCounts::default(),
            walk_errors: 0,
        }
    }

    /// Add a directory's outcome.
    pub fn record(&mut self, path: impl Into<String>, outcome: DirOutcome) {
        if let DirOutcome::Skipped { reason } = outcome {
            self.skipped.record(reason);
        }
        self.directories.push(DirReport {
            path: path.into(),
            outcome,
        });
    }

    /// Directories that reached the test runner.
    pub fn processed(&self) -> impl Iterator<Item = &DirReport> {
        self.directories.iter().filter(|d| !d.outcome.is_skipped())
    }

    pub fn record_walk_error(&mut self) {
        self.walk_errors = self.walk_errors.saturating_add(1);
    }

    #[must_use]
    pub fn measured_count(&self) -> usize {
        self.count_matching(|o| matches!(o, DirOutcome::Measured { .. }))
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count_matching(|o| matches!(o, DirOutcome::MeasurementError { .. }))
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.count_matching(|o| matches!(o, DirOutcome::Flagged { .. }))
    }

    fn count_matching(&self, predicate: impl Fn(&DirOutcome) -> bool) -> usize {
        self.directories
            .iter()
            .filter(|d| predicate(&d.outcome))
            .count()
    }

    /// Map the report to a process exit code.
    ///
    /// Scanning is best-effort: without `strict` the answer is always 0.
    /// With `strict`, any errored or flagged directory yields 1.
    #[must_use]
    pub fn exit_code(&self, strict: bool) -> u8 {
        if strict && (self.error_count() > 0 || self.flagged_count() > 0) {
            1
        } else {
            0
        }
    }

    /// Write the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReportWriteFailed`] if serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::report_write_failed(path, e.to_string()))?;
        fs::write(path, json).map_err(|e| Error::report_write_failed(path, e.to_string()))
    }
}
