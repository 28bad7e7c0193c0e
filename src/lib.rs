#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

//! # memscan
//!
//! Walks a Go source tree, runs each package's tests under the memory
//! profiler, and reports the total allocation `go tool pprof` attributes to
//! them. Packages above an optional limit get their raw profile dumped as
//! Base64 for offline inspection.
//!
//! The pipeline is strictly sequential:
//! [`walker`] → [`discovery`] → [`runner`] ([`toolchain`], [`pprof`], [`size`]) → [`report`].

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod pprof;
pub mod process;
pub mod report;
pub mod runner;
pub mod size;
pub mod toolchain;
pub mod walker;

pub use config::ScanConfig;
pub use error::{Error, Result};
pub use report::{DirOutcome, ScanReport};
pub use size::parse_size;
pub use toolchain::{GoToolchain, Toolchain};
pub use walker::Scanner;
