//! Measuring a single test directory.
//!
//! Runs the package's tests with a memory profile, reads the allocation total
//! back out of `pprof`, and checks it against the configured limit. Every
//! failure along the way ends the directory as a
//! [`DirOutcome::MeasurementError`]; nothing here aborts the scan.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::pprof::extract_total;
use crate::report::DirOutcome;
use crate::size::parse_size;
use crate::toolchain::Toolchain;

/// Measures one directory at a time
pub struct DirectoryRunner<'a, T: Toolchain> {
    config: &'a ScanConfig,
    toolchain: &'a T,
}

impl<'a, T: Toolchain> DirectoryRunner<'a, T> {
    #[must_use]
    pub const fn new(config: &'a ScanConfig, toolchain: &'a T) -> Self {
        Self { config, toolchain }
    }

    /// Measure `package` (slash-delimited, relative to the scan root).
    ///
    /// Raw tool output is written to `out` first when debug is enabled. The
    /// returned outcome has not been rendered yet.
    ///
    /// # Errors
    ///
    /// Returns an error only when writing to `out` fails.
    pub fn measure<W: Write>(&self, package: &str, out: &mut W) -> io::Result<DirOutcome> {
        // Each directory gets its own profile file, removed when `profile` drops.
        let profile = match tempfile::Builder::new()
            .prefix("memscan-")
            .suffix(".mem.out")
            .tempfile()
        {
            Ok(file) => file,
            Err(e) => {
                warn!(path = package, error = %e, "could not create profile file");
                return Ok(DirOutcome::measurement_error(format!(
                    "could not create profile file: {e}"
                )));
            }
        };

        info!(path = package, profile = %profile.path().display(), "running tests");
        let run = match self.toolchain.run_tests(package, profile.path()) {
            Ok(run) => run,
            Err(e) => {
                warn!(path = package, error = %e, "go test could not run");
                return Ok(DirOutcome::measurement_error(e.to_string()));
            }
        };

        if self.config.debug() {
            writeln!(out, "go test ./... output: {}", run.combined_output())?;
        }
        if !run.is_success() {
            warn!(path = package, exit_code = run.exit_code, "tests failed");
            return Ok(DirOutcome::measurement_error(format!(
                "go test exited with code {}",
                run.exit_code
            )));
        }

        // pprof's exit status is not consulted; a missing total is the failure signal.
        let listing = match self.toolchain.list_profile(package, profile.path()) {
            Ok(result) => result.stdout,
            Err(e) => {
                warn!(path = package, error = %e, "pprof could not run");
                String::new()
            }
        };
        if self.config.debug() {
            writeln!(out, "go tool pprof output: {listing}")?;
        }

        let Some(size) = extract_total(&listing) else {
            warn!(path = package, "profile listing has no total");
            return Ok(DirOutcome::measurement_error(
                "profile listing has no Total line",
            ));
        };

        Ok(self.evaluate(size, profile))
    }

    /// Compare a measured size against the limit.
    fn evaluate(&self, size: &str, profile: NamedTempFile) -> DirOutcome {
        let parsed = parse_size(size);
        debug!(size, ?parsed, "parsed size");

        if !self.config.has_limit() {
            return DirOutcome::Measured {
                size: size.to_string(),
                bytes: parsed.ok(),
                size_error: None,
            };
        }

        let bytes = match parsed {
            Ok(bytes) => bytes,
            Err(e) => {
                return DirOutcome::Measured {
                    size: size.to_string(),
                    bytes: None,
                    size_error: Some(e.to_string()),
                };
            }
        };

        let limit_bytes = self.config.limit_bytes();
        if bytes <= limit_bytes {
            return DirOutcome::Measured {
                size: size.to_string(),
                bytes: Some(bytes),
                size_error: None,
            };
        }

        info!(size, bytes, limit_bytes, "allocation limit exceeded");
        DirOutcome::Flagged {
            size: size.to_string(),
            bytes,
            limit_bytes,
            profile_base64: encode_profile(profile.path()),
        }
    }
}

fn encode_profile(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(data) => Some(STANDARD.encode(data)),
        Err(e) => {
            warn!(profile = %path.display(), error = %e, "could not read profile");
            None
        }
    }
}
