//! Release manifest loading.
//!
//! The architecture table lives in a TOML manifest rather than in code. The
//! crate embeds `release.toml` as the default; a different manifest can be
//! supplied on the command line or through `LOGGAR_RELEASE_MANIFEST`, so a
//! new release does not require recompiling the installer.
//!
//! ```toml
//! name = "loggar"
//! version = "0.1.0"
//! binary = "loggar"
//! os = "macos"
//!
//! [[artifact]]
//! arch = "arm64"
//! url = "https://example.test/v0.1.0/loggar_darwin_arm64"
//! sha256 = "<64 hex characters>"
//! ```

use crate::artefact::arch::Architecture;
use crate::artefact::error::ArtefactError;
use crate::artefact::release::{ReleaseArtifact, ReleaseTable};
use crate::artefact::sha256_digest::Sha256Digest;
use crate::target::validate_executable_name;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::ffi::OsString;
use thiserror::Error;

/// Environment variable naming an alternative manifest file.
pub const MANIFEST_ENV: &str = "LOGGAR_RELEASE_MANIFEST";

/// The manifest compiled into the binary.
const EMBEDDED_MANIFEST: &str = include_str!("../release.toml");

/// Operating system assumed when a manifest has no `os` key.
pub const DEFAULT_RELEASE_OS: &str = "macos";

/// Label used in errors about the embedded manifest.
const EMBEDDED_LABEL: &str = "embedded release manifest";

/// Errors from reading or validating a release manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read release manifest {path}: {source}")]
    Read {
        /// The path that was read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or has unexpected keys.
    #[error("invalid release manifest {origin}: {reason}")]
    Parse {
        /// Where the manifest came from.
        origin: String,
        /// The parser's message.
        reason: String,
    },

    /// An `[[artifact]]` entry failed validation.
    #[error("invalid artifact entry {index} in {origin}: {source}")]
    InvalidArtifact {
        /// Where the manifest came from.
        origin: String,
        /// One-based position of the entry.
        index: usize,
        /// The validation failure.
        #[source]
        source: ArtefactError,
    },

    /// An `[[artifact]]` URL is not an HTTP(S) URL.
    #[error("invalid artifact entry {index} in {origin}: unsupported URL \"{url}\"")]
    InvalidUrl {
        /// Where the manifest came from.
        origin: String,
        /// One-based position of the entry.
        index: usize,
        /// The rejected URL.
        url: String,
    },

    /// The manifest lists no artefacts.
    #[error("release manifest {origin} lists no artifacts")]
    Empty {
        /// Where the manifest came from.
        origin: String,
    },

    /// The table could not be assembled, for example duplicate entries.
    #[error("invalid release table in {origin}: {source}")]
    Table {
        /// Where the manifest came from.
        origin: String,
        /// The table construction failure.
        #[source]
        source: ArtefactError,
    },

    /// The `os` key is not a `std::env::consts::OS` style name.
    #[error("invalid os \"{os}\" in {origin}")]
    InvalidOs {
        /// Where the manifest came from.
        origin: String,
        /// The rejected value.
        os: String,
    },

    /// The `binary` key is not a plain file name.
    #[error("invalid binary name in {origin}: {reason}")]
    InvalidBinaryName {
        /// Where the manifest came from.
        origin: String,
        /// The validation failure.
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    name: String,
    version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    binary: Option<String>,
    #[serde(default)]
    os: Option<String>,
    #[serde(default, rename = "artifact")]
    artifacts: Vec<RawArtifact>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArtifact {
    arch: String,
    url: String,
    sha256: String,
}

/// A validated release manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseManifest {
    name: String,
    version: String,
    description: Option<String>,
    homepage: Option<String>,
    binary: String,
    os: String,
    table: ReleaseTable,
}

impl ReleaseManifest {
    /// Parse and validate a manifest. `origin` labels error messages.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] describing the first problem found.
    pub fn parse(source: &str, origin: &str) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(source).map_err(|e| ManifestError::Parse {
            origin: origin.to_owned(),
            reason: e.message().to_owned(),
        })?;

        let binary = raw.binary.unwrap_or_else(|| raw.name.clone());
        validate_executable_name(&binary).map_err(|e| ManifestError::InvalidBinaryName {
            origin: origin.to_owned(),
            reason: e.to_string(),
        })?;

        let os = normalise_os(raw.os.as_deref(), origin)?;

        if raw.artifacts.is_empty() {
            return Err(ManifestError::Empty {
                origin: origin.to_owned(),
            });
        }

        let artifacts = raw
            .artifacts
            .into_iter()
            .enumerate()
            .map(|(position, entry)| build_artifact(entry, position + 1, &binary, origin))
            .collect::<Result<Vec<_>, _>>()?;

        let table = ReleaseTable::from_artifacts(artifacts).map_err(|source| {
            ManifestError::Table {
                origin: origin.to_owned(),
                source,
            }
        })?;

        Ok(Self {
            name: raw.name,
            version: raw.version,
            description: raw.description,
            homepage: raw.homepage,
            binary,
            os,
            table,
        })
    }

    /// The manifest compiled into the installer.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] if the embedded file is malformed.
    pub fn embedded() -> Result<Self, ManifestError> {
        Self::parse(EMBEDDED_MANIFEST, EMBEDDED_LABEL)
    }

    /// Read and validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] if the file cannot be read, or any
    /// validation error from [`Self::parse`].
    pub fn load(path: &Utf8Path) -> Result<Self, ManifestError> {
        let source = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&source, path.as_str())
    }

    /// Load the manifest named on the command line, else the one named by
    /// [`MANIFEST_ENV`], else the embedded one.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::load`] or [`Self::embedded`].
    pub fn resolve(explicit: Option<&Utf8Path>) -> Result<Self, ManifestError> {
        resolve_with(explicit, std::env::var_os(MANIFEST_ENV))
    }

    /// Product name, e.g. `loggar`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Release version, e.g. `0.1.0`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// One-line description, when present.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Project homepage, when present.
    #[must_use]
    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    /// The executable name artefacts install under.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Operating system the artefacts are built for, as named by
    /// `std::env::consts::OS` (e.g. `macos`).
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// The architecture table.
    #[must_use]
    pub const fn table(&self) -> &ReleaseTable {
        &self.table
    }
}

fn resolve_with(
    explicit: Option<&Utf8Path>,
    from_env: Option<OsString>,
) -> Result<ReleaseManifest, ManifestError> {
    if let Some(path) = explicit {
        debug!("loading release manifest from {path}");
        return ReleaseManifest::load(path);
    }
    let env_path = from_env
        .filter(|value| !value.is_empty())
        .map(|value| Utf8PathBuf::from(value.to_string_lossy().into_owned()));
    if let Some(path) = env_path {
        debug!("loading release manifest from {MANIFEST_ENV}={path}");
        return ReleaseManifest::load(&path);
    }
    debug!("using embedded release manifest");
    ReleaseManifest::embedded()
}

fn normalise_os(raw: Option<&str>, origin: &str) -> Result<String, ManifestError> {
    let Some(value) = raw else {
        return Ok(DEFAULT_RELEASE_OS.to_owned());
    };
    let os = value.trim().to_ascii_lowercase();
    if os.is_empty() || !os.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ManifestError::InvalidOs {
            origin: origin.to_owned(),
            os: value.to_owned(),
        });
    }
    // Release assets use the Go/Homebrew name for macOS.
    if os == "darwin" {
        return Ok(DEFAULT_RELEASE_OS.to_owned());
    }
    Ok(os)
}

fn build_artifact(
    entry: RawArtifact,
    index: usize,
    binary: &str,
    origin: &str,
) -> Result<ReleaseArtifact, ManifestError> {
    let invalid = |source| ManifestError::InvalidArtifact {
        origin: origin.to_owned(),
        index,
        source,
    };
    let arch: Architecture = entry.arch.parse().map_err(invalid)?;
    let sha256 = Sha256Digest::try_from(entry.sha256).map_err(invalid)?;
    if !(entry.url.starts_with("https://") || entry.url.starts_with("http://")) {
        return Err(ManifestError::InvalidUrl {
            origin: origin.to_owned(),
            index,
            url: entry.url,
        });
    }
    Ok(ReleaseArtifact::new(arch, entry.url, sha256, binary))
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
