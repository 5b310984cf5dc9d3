//! Atomic installation of verified artefact bytes.
//!
//! Bytes are written to a temporary file inside the bin directory, made
//! executable, synced, and then renamed over the final path. Observers see
//! either the previous file or the complete new one. The staged file is
//! closed before it is handed back, so it can be executed in place before
//! [`StagedBinary::commit`]. A staged file that is dropped without being
//! committed is deleted, so failed or interrupted installs leave no
//! temporary files behind.

use crate::error::{InstallerError, Result};
use crate::target::InstallTarget;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempPath};

/// Permission bits applied to installed executables (rwxr-xr-x).
#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o755;

/// Handles staging of verified bytes into the bin directory.
#[derive(Debug, Clone)]
pub struct Stager {
    target: InstallTarget,
}

impl Stager {
    /// Create a stager for the given target.
    #[must_use]
    pub const fn new(target: InstallTarget) -> Self {
        Self { target }
    }

    /// The install target.
    #[must_use]
    pub const fn target(&self) -> &InstallTarget {
        &self.target
    }

    /// Ensure the bin directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Install`] if the directory cannot be
    /// created or a non-directory occupies its path.
    pub fn prepare(&self) -> Result<()> {
        let bin_dir = self.target.bin_dir();
        fs::create_dir_all(bin_dir).map_err(|e| install_error(bin_dir, &e))?;
        if !bin_dir.is_dir() {
            return Err(InstallerError::Install {
                path: bin_dir.to_owned(),
                reason: "not a directory".to_owned(),
            });
        }
        Ok(())
    }

    /// Write `bytes` to an executable temporary file next to the final path.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Install`] if the temporary file cannot be
    /// created, written, synced, or made executable.
    pub fn stage(&self, bytes: &[u8]) -> Result<StagedBinary> {
        let bin_dir = self.target.bin_dir();
        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{}.", self.target.name()))
            .suffix(".tmp")
            .tempfile_in(bin_dir)
            .map_err(|e| install_error(bin_dir, &e))?;
        let staged_path = Utf8Path::from_path(file.path())
            .map(Utf8Path::to_path_buf)
            .ok_or_else(|| InstallerError::Install {
                path: bin_dir.to_owned(),
                reason: "temporary file path is not valid UTF-8".to_owned(),
            })?;
        debug!("staging {} bytes at {staged_path}", bytes.len());

        file.write_all(bytes)
            .and_then(|()| file.flush())
            .and_then(|()| make_executable(&file))
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| install_error(&staged_path, &e))?;

        Ok(StagedBinary {
            file: file.into_temp_path(),
            path: staged_path,
            destination: self.target.path(),
        })
    }

    /// Prepare, stage, and commit in one step.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Install`] on any filesystem failure; the
    /// previous file at the destination, if any, is left untouched.
    pub fn install(&self, bytes: &[u8]) -> Result<Utf8PathBuf> {
        self.prepare()?;
        self.stage(bytes)?.commit()
    }
}

/// A fully written, closed executable waiting to be renamed into place.
#[derive(Debug)]
pub struct StagedBinary {
    file: TempPath,
    path: Utf8PathBuf,
    destination: Utf8PathBuf,
}

impl StagedBinary {
    /// Path of the temporary file. It is executable and may be run before
    /// the binary is committed.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Final path the binary is renamed to on commit.
    #[must_use]
    pub fn destination(&self) -> &Utf8Path {
        &self.destination
    }

    /// Atomically rename the staged file over the destination.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Install`] if the rename fails, in which case
    /// the temporary file is removed.
    pub fn commit(self) -> Result<Utf8PathBuf> {
        let Self {
            file, destination, ..
        } = self;
        file.persist(&destination)
            .map_err(|e| install_error(&destination, &e.error))?;
        debug!("installed {destination}");
        Ok(destination)
    }
}

/// Write `bytes` to `target` atomically and mark the result executable.
///
/// # Errors
///
/// Returns [`InstallerError::Install`] on any filesystem failure.
pub fn install(bytes: &[u8], target: &InstallTarget) -> Result<Utf8PathBuf> {
    Stager::new(target.clone()).install(bytes)
}

#[cfg(unix)]
fn make_executable(file: &NamedTempFile) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.as_file()
        .set_permissions(fs::Permissions::from_mode(EXECUTABLE_MODE))
}

#[cfg(not(unix))]
fn make_executable(_file: &NamedTempFile) -> std::io::Result<()> {
    Ok(())
}

fn install_error(path: &Utf8Path, err: &std::io::Error) -> InstallerError {
    InstallerError::Install {
        path: path.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[path = "stager_tests.rs"]
mod tests;
