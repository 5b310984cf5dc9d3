//! Error types for artefact architecture, digest, and release table values.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// The architecture is not one the release table can describe.
    #[error("unsupported architecture \"{value}\"; expected one of: {expected}")]
    UnsupportedArchitecture {
        /// The rejected architecture string.
        value: String,
        /// Comma-separated list of accepted architectures.
        expected: String,
    },

    /// The host operating system is not the one the release was built for.
    #[error("no release published for host {host}; releases target {expected}")]
    UnsupportedPlatform {
        /// The host as `os/arch`.
        host: String,
        /// The operating system the release table targets.
        expected: String,
    },

    /// The release table has no entry for a supported architecture.
    #[error("no release artefact published for architecture {arch}")]
    MissingArtefact {
        /// The architecture that was looked up.
        arch: String,
    },

    /// The release table lists the same architecture more than once.
    #[error("architecture {arch} appears more than once in the release table")]
    DuplicateArchitecture {
        /// The repeated architecture.
        arch: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
