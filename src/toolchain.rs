//! Go toolchain invocations.
//!
//! The scan only needs two things from the toolchain: run a package's tests
//! with a memory profile, and render that profile as a source listing. Both
//! go through [`Toolchain`] so the pipeline can be driven without a Go
//! installation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::process::{run_command, CommandResult};

/// External commands the scan pipeline depends on.
pub trait Toolchain {
    /// Run the tests of `package` (slash-delimited, relative to the scan
    /// root), writing a memory profile to `profile`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command could not be run at all. A
    /// failing test suite is a successful call with a non-zero exit code.
    fn run_tests(&self, package: &str, profile: &Path) -> Result<CommandResult>;

    /// Render `profile` as a source-annotated listing.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command could not be run at all.
    fn list_profile(&self, package: &str, profile: &Path) -> Result<CommandResult>;
}

/// The `go` command line tool.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go_binary: String,
    root: PathBuf,
    count: u32,
    timeout: Option<Duration>,
}

impl GoToolchain {
    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            go_binary: config.go_binary().to_string(),
            root: config.root().clone(),
            count: config.count(),
            timeout: config.timeout(),
        }
    }

    /// Arguments for `go test` with race detection and memory profiling.
    #[must_use]
    pub fn test_args(&self, package: &str, profile: &Path) -> Vec<String> {
        vec![
            "test".to_string(),
            "-race".to_string(),
            format!("-count={}", self.count),
            "-memprofile".to_string(),
            profile.to_string_lossy().into_owned(),
            format!("./{package}"),
        ]
    }

    /// Arguments for `go tool pprof -list`.
    ///
    /// The listing filter is the package path with a `.test` suffix, which
    /// is how `go test` names the binary it leaves behind when profiling.
    #[must_use]
    pub fn list_args(package: &str, profile: &Path) -> Vec<String> {
        vec![
            "tool".to_string(),
            "pprof".to_string(),
            "-list".to_string(),
            format!("{package}.test"),
            profile.to_string_lossy().into_owned(),
        ]
    }
}

impl Toolchain for GoToolchain {
    fn run_tests(&self, package: &str, profile: &Path) -> Result<CommandResult> {
        run_command(
            &self.go_binary,
            &self.test_args(package, profile),
            &self.root,
            self.timeout,
        )
    }

    fn list_profile(&self, package: &str, profile: &Path) -> Result<CommandResult> {
        run_command(
            &self.go_binary,
            &Self::list_args(package, profile),
            &self.root,
            self.timeout,
        )
    }
}
