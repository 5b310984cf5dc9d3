//! List command implementation.
//!
//! This module provides the `run_list` command handler, which prints the
//! release table from the resolved manifest.

use log::trace;
use std::io::Write;

use crate::artefact::arch::Architecture;
use crate::cli::ListArgs;
use crate::error::{InstallerError, Result};
use crate::list_output::{format_human, format_json};
use crate::manifest::ReleaseManifest;

/// Lists the release artefacts from the resolved manifest.
///
/// The host architecture is marked when the host runs the release's
/// operating system and its architecture is supported. Output is
/// written to stdout (human-readable by default, JSON with `--json`).
///
/// # Errors
///
/// Returns an error if:
/// - The manifest cannot be loaded
/// - Writing to stdout fails
pub fn run_list(args: &ListArgs, stdout: &mut dyn Write) -> Result<()> {
    run_list_with(args, stdout, detect_host)
}

/// Internal implementation with injectable host detection for testability.
fn run_list_with<F>(args: &ListArgs, stdout: &mut dyn Write, detect_host: F) -> Result<()>
where
    F: FnOnce(&str) -> Option<Architecture>,
{
    let manifest = ReleaseManifest::resolve(args.manifest.as_deref())?;
    let host = detect_host(manifest.os());

    let output = if args.json {
        format_json(&manifest, host)
    } else {
        format_human(&manifest, host)
    };

    writeln!(stdout, "{output}").map_err(|e| InstallerError::WriteFailed { source: e })?;

    Ok(())
}

fn detect_host(release_os: &str) -> Option<Architecture> {
    match Architecture::detect(release_os) {
        Ok(arch) => Some(arch),
        Err(e) => {
            trace!("run_list: host not supported: {e}");
            None
        }
    }
}
