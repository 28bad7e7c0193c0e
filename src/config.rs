//! Configuration for a scan run.
//!
//! Built once from the command line and never mutated afterwards.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default `go test -count` value, repeated to smooth out flaky allocations.
pub const DEFAULT_COUNT: u32 = 5;

/// Default Go toolchain binary.
pub const DEFAULT_GO_BINARY: &str = "go";

/// Configuration for scanning a source tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory to walk; commands run from here
    root: PathBuf,

    /// Go toolchain binary
    go_binary: String,

    /// Print raw child output before interpreting it
    debug: bool,

    /// Flag packages above this many bytes (0 disables the check)
    limit_bytes: u64,

    /// `go test -count` value
    count: u32,

    /// Per-command timeout; `None` waits indefinitely
    timeout: Option<Duration>,

    /// Where to write the JSON report, if anywhere
    report_path: Option<PathBuf>,

    /// Map errored or flagged packages to a failing exit code
    strict: bool,
}

impl ScanConfig {
    /// Create a configuration with defaults for everything but the root.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            go_binary: DEFAULT_GO_BINARY.to_string(),
            debug: false,
            limit_bytes: 0,
            count: DEFAULT_COUNT,
            timeout: None,
            report_path: None,
            strict: false,
        }
    }

    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn with_limit_bytes(mut self, limit_bytes: u64) -> Self {
        self.limit_bytes = limit_bytes;
        self
    }

    #[must_use]
    pub fn with_go_binary(mut self, go_binary: impl Into<String>) -> Self {
        self.go_binary = go_binary.into();
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_report_path(mut self, report_path: Option<PathBuf>) -> Self {
        self.report_path = report_path;
        self
    }

    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Check the configuration is usable.
    ///
    /// The root is deliberately not checked: a missing root shows up as a
    /// walk error and the scan reports nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the repeat count is zero, the go
    /// binary is empty, or the timeout is zero.
    pub fn validate(self) -> Result<Self> {
        if self.count == 0 {
            return Err(Error::invalid_config("count must be at least 1"));
        }
        if self.go_binary.trim().is_empty() {
            return Err(Error::invalid_config("go binary cannot be empty"));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::invalid_config("timeout must be greater than 0"));
        }
        Ok(self)
    }

    #[must_use]
    pub const fn root(&self) -> &PathBuf {
        &self.root
    }

    #[must_use]
    pub fn go_binary(&self) -> &str {
        &self.go_binary
    }

    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub const fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }

    /// Whether the threshold check is active.
    #[must_use]
    pub const fn has_limit(&self) -> bool {
        self.limit_bytes > 0
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub const fn report_path(&self) -> Option<&PathBuf> {
        self.report_path.as_ref()
    }

    #[must_use]
    pub const fn strict(&self) -> bool {
        self.strict
    }
}
