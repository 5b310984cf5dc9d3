//! Verify command implementation.
//!
//! Checks a file that is already on disk against the digest the release
//! manifest publishes for an architecture. Nothing is installed.

use std::io::Write;

use crate::artefact::arch::Architecture;
use crate::artefact::verification::{FileVerificationError, verify_file};
use crate::cli::VerifyArgs;
use crate::error::{InstallerError, Result};
use crate::manifest::ReleaseManifest;

/// Checks `args.file` against the published digest.
///
/// The architecture comes from `--arch`, falling back to host detection
/// against the manifest's operating system.
/// On success a confirmation line is written to stdout.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest cannot be loaded or has no entry for the architecture
/// - The file cannot be read
/// - The digest does not match
/// - Writing to stdout fails
pub fn run_verify(args: &VerifyArgs, stdout: &mut dyn Write) -> Result<()> {
    let manifest = ReleaseManifest::resolve(args.manifest.as_deref())?;
    let arch = match args.arch {
        Some(arch) => arch,
        None => Architecture::detect(manifest.os())?,
    };
    let artefact = manifest.table().select(arch)?;

    let digest =
        verify_file(args.file.as_std_path(), artefact.sha256()).map_err(|err| match err {
            FileVerificationError::Mismatch(mismatch) => InstallerError::IntegrityMismatch(mismatch),
            FileVerificationError::Read { path, source } => InstallerError::Io(
                std::io::Error::new(source.kind(), format!("failed to read {path}: {source}")),
            ),
        })?;

    writeln!(
        stdout,
        "{}: OK ({} {} {arch}, sha256 {digest})",
        args.file,
        manifest.name(),
        manifest.version(),
    )
    .map_err(|e| InstallerError::WriteFailed { source: e })
}
