//! Artefact download logic for release binary retrieval.
//!
//! Provides a trait-based abstraction for fetching artefact bytes, enabling
//! dependency injection for testing, and a bounded retry wrapper that only
//! repeats transient failures.

use log::{debug, warn};
use std::io::Read;
use std::time::Duration;

/// Default network timeout for artefact downloads.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for downloading artefact bytes.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```no_run
/// use loggar_installer::artefact::download::{ArtefactDownloader, HttpDownloader};
///
/// let downloader = HttpDownloader::default();
/// let bytes = downloader.fetch("https://example.test/loggar_darwin_arm64")?;
/// assert!(!bytes.is_empty());
/// # Ok::<(), loggar_installer::artefact::download::DownloadError>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactDownloader {
    /// Download the body at `url` into memory.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, or a non-success
    /// status.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Errors arising from artefact download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request failed before a response arrived, or the body could not
    /// be read.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested artefact was not found (HTTP 404).
    #[error("artefact not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The server answered with a non-success status other than 404.
    #[error("download failed for {url}: HTTP status {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request did not complete within the configured timeout.
    #[error("download timed out for {url}")]
    TimedOut {
        /// The URL that was requested.
        url: String,
    },

    /// I/O error handling the downloaded data.
    #[error("I/O error during download: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Whether repeating the request could plausibly succeed.
    ///
    /// Transport failures, timeouts, HTTP 429, and 5xx responses are
    /// transient. Missing artefacts and other client errors are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::HttpError { .. } | Self::TimedOut { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::NotFound { .. } | Self::Io(_) => false,
        }
    }
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl HttpDownloader {
    /// Create a downloader whose requests fail after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(DOWNLOAD_TIMEOUT)
    }
}

impl ArtefactDownloader for HttpDownloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut body = response.into_body();
        let mut bytes = Vec::new();
        body.as_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| map_read_error(url, &e))?;
        debug!("fetched {} bytes from {url}", bytes.len());
        Ok(bytes)
    }
}

/// How many times, and how patiently, to repeat a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Fetch `url`, retrying transient failures according to `policy`.
///
/// Non-transient errors are returned immediately.
///
/// # Errors
///
/// Returns the last [`DownloadError`] once attempts are exhausted, or the
/// first non-transient one.
pub fn fetch_with_retry(
    downloader: &dyn ArtefactDownloader,
    url: &str,
    policy: RetryPolicy,
) -> Result<Vec<u8>, DownloadError> {
    let mut attempt = 0;
    loop {
        match downloader.fetch(url) {
            Ok(bytes) => return Ok(bytes),
            Err(err) if err.is_transient() && attempt < policy.retries => {
                attempt += 1;
                warn!(
                    "{err}; retrying ({attempt}/{retries})",
                    retries = policy.retries
                );
                if !policy.backoff.is_zero() {
                    std::thread::sleep(policy.backoff);
                }
            }
            Err(err) => return Err(err),
        }
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(status) => DownloadError::Status {
            url: url.to_owned(),
            status: *status,
        },
        ureq::Error::Timeout(_) => DownloadError::TimedOut {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Map a body read failure to a [`DownloadError`].
fn map_read_error(url: &str, err: &std::io::Error) -> DownloadError {
    if err.kind() == std::io::ErrorKind::TimedOut {
        DownloadError::TimedOut {
            url: url.to_owned(),
        }
    } else {
        DownloadError::HttpError {
            url: url.to_owned(),
            reason: err.to_string(),
        }
    }
}
