//! # memscan - command line entry point
//!
//! Per-package failures never change the exit status unless `--strict` is
//! given; the status is decided once, from the finished report.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use memscan::cli::Cli;
use memscan::{parse_size, GoToolchain, Scanner};

fn main() -> ExitCode {
    let cli = Cli::parse_go_style();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing on stderr; stdout carries the report.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let limit_bytes = match parse_size(&cli.limit) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(limit = %cli.limit, error = %e, "rejected limit");
            println!("Could not parse limit string. Please use form (FloatNumber)(TB|GB|MB|KB)");
            return Ok(ExitCode::SUCCESS);
        }
    };

    let config = cli
        .to_config(limit_bytes)
        .validate()
        .context("Invalid configuration")?;
    let toolchain = GoToolchain::from_config(&config);
    let scanner = Scanner::new(config, toolchain);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = scanner.scan(&mut out).context("Failed to write scan output")?;
    out.flush().context("Failed to flush stdout")?;

    if let Some(path) = scanner.config().report_path() {
        report
            .write_json(path)
            .with_context(|| format!("Could not write report to {}", path.display()))?;
    }

    Ok(ExitCode::from(report.exit_code(scanner.config().strict())))
}
