//! CLI definition using clap.
//!
//! Long options may be spelled Go style with a single dash (`-limit=10MB`,
//! `-debug`) as well as with two.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser};

use crate::config::{ScanConfig, DEFAULT_COUNT, DEFAULT_GO_BINARY};

/// memscan - per-package memory usage of Go test suites
#[derive(Parser, Debug)]
#[command(name = "memscan")]
#[command(version)]
#[command(about = "Report how much memory each Go package's tests allocate")]
#[command(
    long_about = "memscan walks a Go source tree, runs every package that has tests under \
`go test -race -memprofile`, and prints the total allocation reported by `go tool pprof` \
for each one. Hidden and vendor directories are ignored."
)]
pub struct Cli {
    /// Add diagnostic info for debugging (raw go test / pprof output)
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub debug: bool,

    /// Print the profile of any package whose tests allocate more than this, e.g. 10MB
    #[arg(long, default_value = "", value_name = "SIZE", allow_hyphen_values = true)]
    pub limit: String,

    /// Directory to scan
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Go toolchain binary
    #[arg(long = "go", default_value = DEFAULT_GO_BINARY, value_name = "BIN")]
    pub go_binary: String,

    /// go test -count value
    #[arg(long, default_value_t = DEFAULT_COUNT, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Kill any go command running longer than this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Write a JSON report to this file after the scan
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Exit with status 1 if any package errored or exceeded the limit
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Increase log verbosity on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long options.
    #[must_use]
    pub fn parse_go_style() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Build the scan configuration from the parsed flags.
    #[must_use]
    pub fn to_config(&self, limit_bytes: u64) -> ScanConfig {
        ScanConfig::new(self.root.clone())
            .with_debug(self.debug)
            .with_limit_bytes(limit_bytes)
            .with_go_binary(self.go_binary.clone())
            .with_count(self.count)
            .with_timeout(self.timeout.map(Duration::from_secs))
            .with_report_path(self.report.clone())
            .with_strict(self.strict)
    }
}

/// Rewrite `-name` and `-name=value` to `--name...` when `name` is one of
/// our long options. Short flags, values and anything after `--` pass through.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let command = Cli::command();
    let long_names: Vec<&str> = command
        .get_arguments()
        .filter_map(clap::Arg::get_long)
        .chain(["help", "version"])
        .collect();

    let mut past_separator = false;
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || past_separator {
                return arg;
            }
            if arg == "--" {
                past_separator = true;
                return arg;
            }
            match arg.to_str().and_then(|s| go_style_long(s, &long_names)) {
                Some(rewritten) => OsString::from(rewritten),
                None => arg,
            }
        })
        .collect()
}

fn go_style_long(arg: &str, long_names: &[&str]) -> Option<String> {
    let rest = arg.strip_prefix('-')?;
    if rest.starts_with('-') {
        return None;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    long_names.contains(&name).then(|| format!("-{arg}"))
}
