//! Tree walk driving the scan pipeline.

use std::io::Write;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::discovery::{is_testable_dir, is_valid_path};
use crate::error::Result;
use crate::report::{DirOutcome, ScanReport, SkipReason};
use crate::runner::DirectoryRunner;
use crate::toolchain::Toolchain;

/// Walks a source tree and measures every test directory in it.
pub struct Scanner<T: Toolchain> {
    config: ScanConfig,
    toolchain: T,
}

impl<T: Toolchain> Scanner<T> {
    #[must_use]
    pub const fn new(config: ScanConfig, toolchain: T) -> Self {
        Self { config, toolchain }
    }

    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    #[must_use]
    pub const fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Walk the tree in pre-order, rendering each measured directory to
    /// `out` as soon as it finishes.
    ///
    /// Walk errors and per-directory failures are recorded in the report and
    /// never stop the walk.
    ///
    /// # Errors
    ///
    /// Returns an error only when writing to `out` fails.
    pub fn scan<W: Write>(&self, out: &mut W) -> Result<ScanReport> {
        let root = self.config.root();
        let runner = DirectoryRunner::new(&self.config, &self.toolchain);
        let mut report = ScanReport::new(&self.config);

        info!(root = %root.display(), limit_bytes = self.config.limit_bytes(), "starting scan");

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping path due to walk error");
                    report.record_walk_error();
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let path = relative_path(root, entry.path());
            let outcome = match classify(&path, entry.path()) {
                Some(reason) => DirOutcome::Skipped { reason },
                None => runner.measure(&path, out)?,
            };

            outcome.render(&path, out)?;
            report.record(path, outcome);
        }

        info!(
            measured = report.measured_count(),
            flagged = report.flagged_count(),
            errors = report.error_count(),
            walk_errors = report.walk_errors,
            "scan complete"
        );
        Ok(report)
    }
}

/// Decide whether a directory is skipped before any command runs.
fn classify(path: &str, dir: &Path) -> Option<SkipReason> {
    if !is_valid_path(path) {
        debug!(path, "filtered");
        return Some(SkipReason::Filtered);
    }
    match is_testable_dir(dir) {
        Ok(true) => None,
        Ok(false) => Some(SkipReason::NoTests),
        Err(e) => {
            debug!(path, error = %e, "could not list directory");
            Some(SkipReason::Unreadable)
        }
    }
}

/// Slash-delimited path of `path` relative to `root`; the root itself is `"."`.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}
