//! Shared test utilities for the installer crate.

use crate::artefact::download::{ArtefactDownloader, DownloadError};
use crate::artefact::sha256_digest::Sha256Digest;
use crate::smoke::CommandExecutor;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with the given stdout.
#[must_use]
pub fn success_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Lower-case hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256Digest::of(bytes).into_inner()
}

/// Render a release manifest with one `[[artifact]]` entry per
/// `(arch, url, sha256)` triple.
#[must_use]
pub fn manifest_toml(binary: &str, artifacts: &[(&str, &str, &str)]) -> String {
    let mut toml = format!(
        "name = \"loggar\"\nversion = \"0.1.0\"\ndescription = \"AI-powered log triage CLI\"\nbinary = \"{binary}\"\n"
    );
    for (arch, url, sha256) in artifacts {
        toml.push_str(&format!(
            "\n[[artifact]]\narch = \"{arch}\"\nurl = \"{url}\"\nsha256 = \"{sha256}\"\n"
        ));
    }
    toml
}

/// Run `f` with `LOGGAR_BIN_DIR` set to `dir`.
pub fn with_bin_dir_env<R>(dir: &Path, f: impl FnOnce() -> R) -> R {
    temp_env::with_var(crate::target::BIN_DIR_ENV, Some(dir), f)
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute.
    pub program: String,
    /// The arguments to pass to the program.
    pub args: Vec<&'static str>,
    /// The result to return when this command is invoked.
    pub result: io::Result<Output>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, program: &Path, args: &[&str], _timeout: Duration) -> io::Result<Output> {
        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::other("unexpected command invocation"))?;

        assert_eq!(Path::new(&call.program), program);
        assert_eq!(call.args.as_slice(), args);

        call.result
    }
}

/// One invocation seen by [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The program that was run.
    pub program: PathBuf,
    /// The arguments it was given.
    pub args: Vec<String>,
    /// The program file's contents at the time of the call, if readable.
    pub contents: Option<Vec<u8>>,
}

/// A `CommandExecutor` that answers every call with the same output and
/// records what was run.
///
/// Useful when the program path is not known in advance, such as a staged
/// binary with a random temporary name.
#[derive(Debug)]
pub struct RecordingExecutor {
    output: Output,
    calls: RefCell<Vec<RecordedCall>>,
}

impl RecordingExecutor {
    /// Creates an executor that returns `output` for every call.
    #[must_use]
    pub const fn new(output: Output) -> Self {
        Self {
            output,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn run(&self, program: &Path, args: &[&str], _timeout: Duration) -> io::Result<Output> {
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_path_buf(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            contents: std::fs::read(program).ok(),
        });
        Ok(self.output.clone())
    }
}

/// A canned response for [`StubDownloader`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Serve these bytes.
    Body(Vec<u8>),
    /// Fail with HTTP 404.
    NotFound,
    /// Fail with the given HTTP status.
    Status(u16),
    /// Fail before a response arrives.
    Transport(String),
}

/// An `ArtefactDownloader` that serves canned responses by URL.
///
/// Each URL may be given a queue of responses; the last response repeats
/// once the queue is exhausted. Every request is recorded.
#[derive(Debug, Default)]
pub struct StubDownloader {
    responses: RefCell<HashMap<String, VecDeque<StubResponse>>>,
    requests: RefCell<Vec<String>>,
}

impl StubDownloader {
    /// Create a downloader with no responses configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `response` for `url`.
    #[must_use]
    pub fn with_response(self, url: &str, response: StubResponse) -> Self {
        self.responses
            .borrow_mut()
            .entry(url.to_owned())
            .or_default()
            .push_back(response);
        self
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ArtefactDownloader for StubDownloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.requests.borrow_mut().push(url.to_owned());
        let mut responses = self.responses.borrow_mut();
        let queue = responses
            .get_mut(url)
            .ok_or_else(|| DownloadError::NotFound {
                url: url.to_owned(),
            })?;
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match response {
            Some(StubResponse::Body(bytes)) => Ok(bytes),
            Some(StubResponse::Status(status)) => Err(DownloadError::Status {
                url: url.to_owned(),
                status,
            }),
            Some(StubResponse::Transport(reason)) => Err(DownloadError::HttpError {
                url: url.to_owned(),
                reason,
            }),
            Some(StubResponse::NotFound) | None => Err(DownloadError::NotFound {
                url: url.to_owned(),
            }),
        }
    }
}
