//! Error types for the loggar installer CLI.
//!
//! Every failure is terminal for a single install run. Each variant maps to
//! a distinct process exit code so scripts can tell a network problem from a
//! tampered download or a broken binary.

use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use crate::artefact::verification::IntegrityMismatch;
use crate::manifest::ManifestError;
use crate::target::TargetError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during the installation process.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The host (or requested) platform has no release artefact.
    #[error(transparent)]
    UnsupportedArchitecture(ArtefactError),

    /// Fetching the artefact failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The downloaded bytes do not match the published digest.
    #[error(transparent)]
    IntegrityMismatch(#[from] IntegrityMismatch),

    /// Writing, chmod-ing, or renaming the executable failed.
    #[error("failed to install {path}: {reason}")]
    Install {
        /// The path being written.
        path: Utf8PathBuf,
        /// Description of the filesystem failure.
        reason: String,
    },

    /// The installed binary did not answer `version` successfully.
    #[error("smoke test failed for {path}: {reason}")]
    SmokeTestFailed {
        /// The installed executable.
        path: Utf8PathBuf,
        /// What went wrong when running it.
        reason: String,
    },

    /// The release manifest could not be loaded.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The install target is invalid or could not be determined.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// The process exit code reported for this error.
    ///
    /// | Code | Meaning |
    /// |------|---------|
    /// | 1 | I/O or output failure |
    /// | 3 | unsupported architecture |
    /// | 4 | download failure |
    /// | 5 | integrity mismatch |
    /// | 6 | install failure |
    /// | 7 | smoke test failure |
    /// | 8 | invalid manifest or install target |
    ///
    /// Code 2 is left to clap for usage errors.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedArchitecture(_) => 3,
            Self::Download(_) => 4,
            Self::IntegrityMismatch(_) => 5,
            Self::Install { .. } => 6,
            Self::SmokeTestFailed { .. } => 7,
            Self::Manifest(_) | Self::Target(_) => 8,
            Self::Io(_) | Self::WriteFailed { .. } => 1,
        }
    }
}

impl From<ArtefactError> for InstallerError {
    fn from(err: ArtefactError) -> Self {
        Self::UnsupportedArchitecture(err)
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
