//! CPU architecture identifiers for release artefact selection.
//!
//! Only the architectures with published release builds are representable.
//! Host detection maps the compiler's architecture name onto this set and
//! rejects anything else rather than guessing a default. A host whose
//! operating system differs from the one the release was built for is
//! rejected too: an `x86_64` Linux machine is not an `amd64` macOS one.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CPU architecture with a published release build.
///
/// # Examples
///
/// ```
/// use loggar_installer::artefact::arch::Architecture;
///
/// let arch: Architecture = "aarch64".parse().expect("known alias");
/// assert_eq!(arch, Architecture::Arm64);
/// assert_eq!(arch.as_str(), "arm64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Architecture {
    /// 64-bit ARM (`aarch64`).
    Arm64,
    /// 64-bit x86 (`x86_64`).
    Amd64,
}

impl Architecture {
    /// Every supported architecture, in table order.
    pub const ALL: [Self; 2] = [Self::Arm64, Self::Amd64];

    /// Return the canonical release name (`arm64` or `amd64`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::Amd64 => "amd64",
        }
    }

    /// Detect the architecture of the running host for a release built for
    /// `release_os` (a `std::env::consts::OS` name such as `macos`).
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] when the host runs a
    /// different operating system, and
    /// [`ArtefactError::UnsupportedArchitecture`] when the host is neither
    /// `aarch64` nor `x86_64`.
    pub fn detect(release_os: &str) -> Result<Self> {
        Self::from_host_platform(std::env::consts::OS, std::env::consts::ARCH, release_os)
    }

    /// Map a host operating system and architecture onto a release built
    /// for `release_os`.
    ///
    /// # Errors
    ///
    /// As for [`Self::detect`].
    pub fn from_host_platform(host_os: &str, host_arch: &str, release_os: &str) -> Result<Self> {
        if host_os != release_os {
            return Err(ArtefactError::UnsupportedPlatform {
                host: format!("{host_os}/{host_arch}"),
                expected: release_os.to_owned(),
            });
        }
        Self::from_host(host_arch)
    }

    /// Map a Rust host architecture name (as in `std::env::consts::ARCH`).
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedArchitecture`] for any name
    /// outside the supported set, including 32-bit ARM.
    pub fn from_host(host_arch: &str) -> Result<Self> {
        match host_arch {
            "aarch64" => Ok(Self::Arm64),
            "x86_64" => Ok(Self::Amd64),
            other => Err(unsupported(other)),
        }
    }
}

impl FromStr for Architecture {
    type Err = ArtefactError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "amd64" | "x86_64" | "x86-64" => Ok(Self::Amd64),
            _ => Err(unsupported(value)),
        }
    }
}

impl TryFrom<String> for Architecture {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unsupported(value: &str) -> ArtefactError {
    ArtefactError::UnsupportedArchitecture {
        value: value.to_owned(),
        expected: Architecture::ALL
            .iter()
            .map(|arch| arch.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
