//! Install pipeline orchestration.
//!
//! Runs the fixed sequence select → fetch → verify → stage → self-test →
//! commit. Nothing is written to the bin directory until the digest matches,
//! and the staged binary replaces the installed one only after it has
//! answered `version`, so every failure leaves the previous install intact.

use crate::artefact::arch::Architecture;
use crate::artefact::download::{ArtefactDownloader, RetryPolicy, fetch_with_retry};
use crate::artefact::release::ReleaseArtifact;
use crate::artefact::verification::verify;
use crate::error::{InstallerError, Result};
use crate::manifest::ReleaseManifest;
use crate::output::write_stderr_line;
use crate::smoke::{CommandExecutor, self_test};
use crate::stager::Stager;
use crate::target::InstallTarget;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;

/// Inputs for one install run.
#[derive(Debug)]
pub struct InstallConfig<'a> {
    /// The release being installed.
    pub manifest: &'a ReleaseManifest,
    /// Architecture to select.
    pub arch: Architecture,
    /// Where the binary lands.
    pub target: &'a InstallTarget,
    /// Retry behaviour for the download.
    pub retry: RetryPolicy,
    /// Smoke-test timeout, or `None` to skip the smoke test.
    pub smoke_test: Option<Duration>,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// The artefact that was installed.
    pub artefact: ReleaseArtifact,
    /// Final path of the executable.
    pub path: Utf8PathBuf,
    /// Size of the installed file in bytes.
    pub bytes: usize,
    /// Output of `<binary> version`, when the smoke test ran.
    pub version_output: Option<String>,
}

/// Select the artefact for `config.arch`, renamed to the target's name.
///
/// # Errors
///
/// Returns [`crate::error::InstallerError::UnsupportedArchitecture`] when
/// the manifest has no entry for the architecture.
pub fn plan(config: &InstallConfig<'_>) -> Result<ReleaseArtifact> {
    let artefact = config.manifest.table().select(config.arch)?;
    Ok(artefact.clone().with_install_name(config.target.name()))
}

/// Download, verify, install, and smoke-test the release binary.
///
/// # Errors
///
/// Returns the first failure; see [`InstallerError`] for the taxonomy. On
/// any failure the install path is left as it was.
pub fn run_install(
    config: &InstallConfig<'_>,
    downloader: &dyn ArtefactDownloader,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<InstallReport> {
    let artefact = plan(config)?;
    let quiet = config.quiet;

    progress(
        quiet,
        stderr,
        format!(
            "Downloading {} {} for {}...",
            config.manifest.name(),
            config.manifest.version(),
            artefact.arch()
        ),
    );
    let bytes = fetch_with_retry(downloader, artefact.url(), config.retry)?;
    info!("downloaded {} ({} bytes)", artefact.asset_name(), bytes.len());

    progress(quiet, stderr, format!("Verifying SHA-256 {}...", artefact.sha256()));
    let bytes = verify(bytes, artefact.sha256())?;

    progress(quiet, stderr, format!("Installing to {}...", config.target));
    let stager = Stager::new(config.target.clone());
    stager.prepare()?;
    let staged = stager.stage(&bytes)?;

    let version_output = match config.smoke_test {
        Some(timeout) => {
            progress(
                quiet,
                stderr,
                format!("Running `{} version`...", config.target.name()),
            );
            let output = self_test(executor, staged.path(), timeout)
                .map_err(|err| attribute_to(err, staged.destination()))?;
            Some(output)
        }
        None => None,
    };

    let path = staged.commit()?;

    Ok(InstallReport {
        artefact,
        path,
        bytes: bytes.len(),
        version_output,
    })
}

/// Report a staged smoke-test failure against the install path.
fn attribute_to(err: InstallerError, destination: &Utf8Path) -> InstallerError {
    match err {
        InstallerError::SmokeTestFailed { reason, .. } => InstallerError::SmokeTestFailed {
            path: destination.to_owned(),
            reason: format!("{reason}; nothing was installed"),
        },
        other => other,
    }
}

fn progress(quiet: bool, stderr: &mut dyn Write, message: impl Display) {
    if !quiet {
        write_stderr_line(stderr, message);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
