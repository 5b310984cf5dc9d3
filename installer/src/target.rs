//! Install target resolution.
//!
//! Determines the directory the binary lands in and the name it is installed
//! under. The directory comes from, in order: an explicit path, the
//! `LOGGAR_BIN_DIR` environment variable, the platform executable directory,
//! and finally `$HOME/.local/bin`.

use camino::{Utf8Path, Utf8PathBuf};
use directories_next::BaseDirs;
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Environment variable overriding the default bin directory.
pub const BIN_DIR_ENV: &str = "LOGGAR_BIN_DIR";

/// Errors raised while resolving where to install.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// The executable name is empty or would escape the bin directory.
    #[error("invalid executable name \"{name}\": {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Description of the validation failure.
        reason: &'static str,
    },

    /// No bin directory could be derived from the environment.
    #[error("could not determine a bin directory; pass --bin-dir or set {BIN_DIR_ENV}")]
    NoBinDir,

    /// A platform directory is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },
}

/// Where the binary lands: a bin directory plus an executable name.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use loggar_installer::target::InstallTarget;
///
/// let target = InstallTarget::new(Utf8PathBuf::from("/opt/bin"), "loggar")
///     .expect("valid name");
/// assert_eq!(target.path(), Utf8PathBuf::from("/opt/bin/loggar"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    bin_dir: Utf8PathBuf,
    name: String,
}

impl InstallTarget {
    /// Create a target after validating `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::InvalidName`] if the name is not a plain file
    /// name.
    pub fn new(bin_dir: Utf8PathBuf, name: &str) -> Result<Self, TargetError> {
        validate_executable_name(name)?;
        Ok(Self {
            bin_dir,
            name: name.to_owned(),
        })
    }

    /// The directory the executable is installed into.
    #[must_use]
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// The final executable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full path of the installed executable.
    #[must_use]
    pub fn path(&self) -> Utf8PathBuf {
        self.bin_dir.join(&self.name)
    }
}

impl fmt::Display for InstallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Check that `name` is a single path component.
///
/// # Errors
///
/// Returns [`TargetError::InvalidName`] for empty names, `.`/`..`, names
/// containing a path separator, and names containing NUL.
pub fn validate_executable_name(name: &str) -> Result<(), TargetError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name refers to a directory")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.contains('\0') {
        Some("name contains a NUL byte")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(TargetError::InvalidName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Resolve the bin directory from an explicit choice or the environment.
///
/// # Errors
///
/// Returns [`TargetError::NoBinDir`] when neither an explicit path, the
/// environment, nor the platform provide a directory.
pub fn resolve_bin_dir(explicit: Option<&Utf8Path>) -> Result<Utf8PathBuf, TargetError> {
    let from_env = std::env::var_os(BIN_DIR_ENV);
    resolve_bin_dir_with(explicit, from_env.as_deref(), default_bin_dir)
}

/// Testable inner function with an injected platform fallback.
fn resolve_bin_dir_with<F>(
    explicit: Option<&Utf8Path>,
    from_env: Option<&OsStr>,
    platform_default: F,
) -> Result<Utf8PathBuf, TargetError>
where
    F: FnOnce() -> Result<Option<Utf8PathBuf>, TargetError>,
{
    if let Some(dir) = explicit {
        return Ok(dir.to_owned());
    }
    if let Some(value) = from_env.filter(|value| !value.is_empty()) {
        return utf8_path(Path::new(value));
    }
    platform_default()?.ok_or(TargetError::NoBinDir)
}

/// Return the platform bin directory, if one can be determined.
///
/// Uses the XDG executable directory where the platform defines one
/// (typically `~/.local/bin` on Linux) and `$HOME/.local/bin` elsewhere.
///
/// # Errors
///
/// Returns [`TargetError::NonUtf8Path`] if the directory is not UTF-8.
pub fn default_bin_dir() -> Result<Option<Utf8PathBuf>, TargetError> {
    let Some(dirs) = BaseDirs::new() else {
        return Ok(None);
    };
    let dir = match dirs.executable_dir() {
        Some(dir) => dir.to_path_buf(),
        None => dirs.home_dir().join(".local").join("bin"),
    };
    utf8_path(&dir).map(Some)
}

/// Whether `dir` appears in the current `PATH`.
#[must_use]
pub fn is_directory_in_path(dir: &Utf8Path) -> bool {
    std::env::var_os("PATH")
        .is_some_and(|path| std::env::split_paths(&path).any(|p| p == dir.as_std_path()))
}

fn utf8_path(path: &Path) -> Result<Utf8PathBuf, TargetError> {
    Utf8PathBuf::try_from(path.to_path_buf()).map_err(|e| TargetError::NonUtf8Path {
        path: e.into_path_buf().display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn no_platform_dir() -> Result<Option<Utf8PathBuf>, TargetError> {
        Ok(None)
    }

    #[rstest]
    #[case::plain("loggar")]
    #[case::alternate("triage")]
    #[case::dotted("loggar.v2")]
    fn accepts_plain_names(#[case] name: &str) {
        assert!(validate_executable_name(name).is_ok());
    }

    #[rstest]
    #[case::empty("")]
    #[case::current_dir(".")]
    #[case::parent_dir("..")]
    #[case::nested("bin/loggar")]
    #[case::escape("../loggar")]
    #[case::windows_separator("bin\\loggar")]
    fn rejects_names_that_are_not_file_names(#[case] name: &str) {
        let err = validate_executable_name(name).expect_err("expected rejection");
        assert!(matches!(err, TargetError::InvalidName { .. }));
    }

    #[test]
    fn path_joins_bin_dir_and_name() {
        let target = InstallTarget::new(Utf8PathBuf::from("/usr/local/bin"), "triage")
            .expect("valid name");
        assert_eq!(target.path(), Utf8PathBuf::from("/usr/local/bin/triage"));
        assert_eq!(target.to_string(), "/usr/local/bin/triage");
    }

    #[test]
    fn explicit_bin_dir_wins_over_environment() {
        let explicit = Utf8PathBuf::from("/explicit/bin");
        let resolved = resolve_bin_dir_with(
            Some(&explicit),
            Some(OsStr::new("/env/bin")),
            no_platform_dir,
        )
        .expect("explicit path");
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn environment_wins_over_platform_default() {
        let resolved = resolve_bin_dir_with(None, Some(OsStr::new("/env/bin")), || {
            Ok(Some(Utf8PathBuf::from("/platform/bin")))
        })
        .expect("env path");
        assert_eq!(resolved, Utf8PathBuf::from("/env/bin"));
    }

    #[test]
    fn empty_environment_value_is_ignored() {
        let resolved = resolve_bin_dir_with(None, Some(OsStr::new("")), || {
            Ok(Some(Utf8PathBuf::from("/platform/bin")))
        })
        .expect("platform path");
        assert_eq!(resolved, Utf8PathBuf::from("/platform/bin"));
    }

    #[test]
    fn missing_everything_is_an_error() {
        let err = resolve_bin_dir_with(None, None, no_platform_dir).expect_err("no dir");
        assert_eq!(err, TargetError::NoBinDir);
    }

    #[test]
    fn resolve_bin_dir_reads_environment_variable() {
        temp_env::with_var(BIN_DIR_ENV, Some("/from/env"), || {
            let resolved = resolve_bin_dir(None).expect("env path");
            assert_eq!(resolved, Utf8PathBuf::from("/from/env"));
        });
    }

    #[test]
    fn random_directory_is_not_in_path() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
        assert!(!is_directory_in_path(&dir));
    }
}
