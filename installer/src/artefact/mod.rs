//! Release artefact selection, download, and verification.
//!
//! # Sub-modules
//!
//! - [`arch`] - CPU architecture enum and host detection (`Architecture`).
//! - [`download`] - Artefact download trait, HTTP implementation, retries.
//! - [`error`] - Semantic error types for validation failures.
//! - [`release`] - Release artefact description and lookup table.
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`verification`] - Digest computation and integrity checks.

pub mod arch;
pub mod download;
pub mod error;
pub mod release;
pub mod sha256_digest;
pub mod verification;
