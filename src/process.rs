//! Child process execution with captured output.
//!
//! Commands block until they exit. A timeout is optional; without one a hung
//! child hangs the scan. With one, the child runs in its own process group so
//! that anything it spawned (the `<pkg>.test` binary under `go test`) dies
//! with it.

use std::{
    io::Read,
    path::Path,
    process::{Child, Command, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::debug;

use crate::error::{Error, Result};

/// Poll interval while waiting on a child with a deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Check if command succeeded (exit code 0).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr.
    #[must_use]
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Execute a command in a working directory and capture its output.
///
/// # Errors
///
/// Returns [`Error::CommandNotFound`] if the binary does not exist,
/// [`Error::CommandSpawnFailed`] for other spawn failures, and
/// [`Error::CommandTimeout`] if `timeout` elapses first (the child is killed).
pub fn run_command(
    cmd: &str,
    args: &[String],
    cwd: &Path,
    timeout: Option<Duration>,
) -> Result<CommandResult> {
    debug!(cmd, ?args, cwd = %cwd.display(), "running command");

    let mut command = Command::new(cmd);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if timeout.is_some() {
        own_process_group(&mut command);
    }

    let mut child = command.spawn().map_err(|e| map_command_error(cmd, e))?;

    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let exit_code = match timeout {
        Some(limit) => wait_with_deadline(&mut child, cmd, limit)?,
        None => child.wait()?.code().unwrap_or(-1),
    };

    Ok(CommandResult {
        stdout: join_reader(stdout_handle),
        stderr: join_reader(stderr_handle),
        exit_code,
    })
}

fn wait_with_deadline(child: &mut Child, cmd: &str, limit: Duration) -> Result<i32> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.code().unwrap_or(-1));
        }

        if start.elapsed() >= limit {
            debug!(cmd, pid = child.id(), "timed out, killing process group");
            kill_process_group(child);
            return Err(Error::CommandTimeout {
                cmd: cmd.to_string(),
                timeout_secs: limit.as_secs(),
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

/// Kill the child and every process in its group, then reap the child.
///
/// The group id equals the child's pid because of [`own_process_group`].
fn kill_process_group(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let _ = Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = source.read_to_end(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default()
}

fn map_command_error(cmd: &str, error: std::io::Error) -> Error {
    if error.kind() == std::io::ErrorKind::NotFound {
        Error::CommandNotFound {
            cmd: cmd.to_string(),
        }
    } else {
        Error::command_spawn_failed(cmd, error.to_string())
    }
}
