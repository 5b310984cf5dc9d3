//! Pre-commit smoke test.
//!
//! Runs the staged binary with `version` and treats a spawn failure, a
//! non-zero exit, or a hang past the timeout as a failed install.

use crate::error::{InstallerError, Result};
use camino::Utf8Path;
use log::debug;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Argument passed to the installed binary.
pub const SMOKE_TEST_ARG: &str = "version";

/// How long the installed binary may take to answer.
pub const SMOKE_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs `program` with `args`, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning or waiting, and an
    /// error of kind [`io::ErrorKind::TimedOut`] if the child is still
    /// running when the timeout elapses.
    fn run(&self, program: &Path, args: &[&str], timeout: Duration) -> io::Result<Output>;
}

/// Executes commands on the host system.
///
/// # Examples
///
/// ```no_run
/// use loggar_installer::smoke::{CommandExecutor, SystemCommandExecutor};
/// use std::path::Path;
/// use std::time::Duration;
///
/// let output = SystemCommandExecutor.run(
///     Path::new("/usr/local/bin/loggar"),
///     &["version"],
///     Duration::from_secs(5),
/// )?;
/// assert!(output.status.success());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, program: &Path, args: &[&str], timeout: Duration) -> io::Result<Output> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Both pipes are drained while waiting; a child blocked on a full
        // pipe would otherwise look hung.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let Some(status) = child.wait_timeout(timeout)? else {
            // Best effort: the child may already have exited.
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no response within {}s", timeout.as_secs()),
            ));
        };

        Ok(Output {
            status,
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
        })
    }
}

type PipeReader = JoinHandle<io::Result<Vec<u8>>>;

fn drain(mut pipe: impl Read + Send + 'static) -> PipeReader {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(reader: Option<PipeReader>) -> io::Result<Vec<u8>> {
    match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::other("output reader panicked"))?,
        None => Ok(Vec::new()),
    }
}

/// Run `<path> version` and return its trimmed standard output.
///
/// # Errors
///
/// Returns [`InstallerError::SmokeTestFailed`] if the binary cannot be
/// executed, exits unsuccessfully, or times out.
pub fn self_test(
    executor: &dyn CommandExecutor,
    path: &Utf8Path,
    timeout: Duration,
) -> Result<String> {
    let failed = |reason: String| InstallerError::SmokeTestFailed {
        path: path.to_owned(),
        reason,
    };

    let output = executor
        .run(path.as_std_path(), &[SMOKE_TEST_ARG], timeout)
        .map_err(|e| failed(format!("could not run `{path} {SMOKE_TEST_ARG}`: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        let reason = if detail.is_empty() {
            format!("`{SMOKE_TEST_ARG}` exited with {}", output.status)
        } else {
            format!("`{SMOKE_TEST_ARG}` exited with {}: {detail}", output.status)
        };
        return Err(failed(reason));
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    debug!("smoke test output: {version}");
    Ok(version)
}
