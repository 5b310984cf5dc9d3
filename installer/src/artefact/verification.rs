//! Integrity verification for downloaded artefacts.
//!
//! Verification is mandatory: the installer never writes bytes to the
//! install path unless their SHA-256 digest matches the release table.

use super::sha256_digest::Sha256Digest;
use log::debug;
use std::fs::File;
use std::path::Path;

/// The downloaded bytes do not hash to the expected digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("checksum mismatch: expected {expected}, actual {actual}")]
pub struct IntegrityMismatch {
    /// Digest recorded in the release table.
    pub expected: Sha256Digest,
    /// Digest of the bytes actually received.
    pub actual: Sha256Digest,
}

/// Compute the SHA-256 digest of `bytes`.
#[must_use]
pub fn compute_sha256(bytes: &[u8]) -> Sha256Digest {
    Sha256Digest::of(bytes)
}

/// Check `bytes` against `expected`, handing the bytes back on success.
///
/// # Errors
///
/// Returns [`IntegrityMismatch`] when the digests differ. The comparison is
/// case-insensitive because [`Sha256Digest`] stores lower-case hex.
///
/// # Examples
///
/// ```
/// use loggar_installer::artefact::sha256_digest::Sha256Digest;
/// use loggar_installer::artefact::verification::verify;
///
/// let expected = Sha256Digest::of(b"payload");
/// let bytes = verify(b"payload".to_vec(), &expected).expect("digest matches");
/// assert_eq!(bytes, b"payload");
/// assert!(verify(b"tampered".to_vec(), &expected).is_err());
/// ```
pub fn verify(bytes: Vec<u8>, expected: &Sha256Digest) -> Result<Vec<u8>, IntegrityMismatch> {
    let actual = compute_sha256(&bytes);
    debug!("computed sha256 {actual} over {} bytes", bytes.len());
    if actual.matches(expected) {
        Ok(bytes)
    } else {
        Err(IntegrityMismatch {
            expected: expected.clone(),
            actual,
        })
    }
}

/// Errors from checking a file already on disk.
#[derive(Debug, thiserror::Error)]
pub enum FileVerificationError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file that was being hashed.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file contents do not match.
    #[error(transparent)]
    Mismatch(#[from] IntegrityMismatch),
}

/// Hash the file at `path` and compare it with `expected`.
///
/// # Errors
///
/// Returns [`FileVerificationError::Read`] if the file cannot be read and
/// [`FileVerificationError::Mismatch`] if the digests differ.
pub fn verify_file(path: &Path, expected: &Sha256Digest) -> Result<Sha256Digest, FileVerificationError> {
    let read_error = |source| FileVerificationError::Read {
        path: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    let actual = Sha256Digest::of_reader(file).map_err(read_error)?;
    if actual.matches(expected) {
        Ok(actual)
    } else {
        Err(IntegrityMismatch {
            expected: expected.clone(),
            actual,
        }
        .into())
    }
}
