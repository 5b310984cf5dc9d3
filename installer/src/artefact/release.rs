//! Release artefact descriptions and the per-architecture lookup table.
//!
//! Selection is a total lookup keyed by [`Architecture`]: an architecture
//! either has exactly one entry or the lookup fails. There is no default
//! branch.

use super::arch::Architecture;
use super::error::{ArtefactError, Result};
use super::sha256_digest::Sha256Digest;
use serde::Serialize;
use std::collections::BTreeMap;

/// One downloadable build for one architecture.
///
/// # Examples
///
/// ```
/// use loggar_installer::artefact::arch::Architecture;
/// use loggar_installer::artefact::release::ReleaseArtifact;
/// use loggar_installer::artefact::sha256_digest::Sha256Digest;
///
/// let digest = Sha256Digest::try_from("0".repeat(64)).expect("valid digest");
/// let artefact = ReleaseArtifact::new(
///     Architecture::Arm64,
///     "https://example.test/v0.1.0/loggar_darwin_arm64",
///     digest,
///     "loggar",
/// );
/// assert_eq!(artefact.asset_name(), "loggar_darwin_arm64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseArtifact {
    arch: Architecture,
    url: String,
    sha256: Sha256Digest,
    install_name: String,
}

impl ReleaseArtifact {
    /// Create an artefact description.
    #[must_use]
    pub fn new(
        arch: Architecture,
        url: impl Into<String>,
        sha256: Sha256Digest,
        install_name: impl Into<String>,
    ) -> Self {
        Self {
            arch,
            url: url.into(),
            sha256,
            install_name: install_name.into(),
        }
    }

    /// The architecture this build targets.
    #[must_use]
    pub const fn arch(&self) -> Architecture {
        self.arch
    }

    /// The download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The digest the downloaded bytes must hash to.
    #[must_use]
    pub const fn sha256(&self) -> &Sha256Digest {
        &self.sha256
    }

    /// The executable name used once installed.
    #[must_use]
    pub fn install_name(&self) -> &str {
        &self.install_name
    }

    /// The final path segment of the download URL, ignoring any query.
    #[must_use]
    pub fn asset_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Return a copy installed under a different executable name.
    #[must_use]
    pub fn with_install_name(mut self, install_name: impl Into<String>) -> Self {
        self.install_name = install_name.into();
        self
    }
}

/// The fixed architecture → artefact table for one release.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReleaseTable {
    entries: BTreeMap<Architecture, ReleaseArtifact>,
}

impl ReleaseTable {
    /// Build a table from artefact descriptions.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::DuplicateArchitecture`] if two artefacts
    /// share an architecture.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = ReleaseArtifact>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for artefact in artifacts {
            let arch = artefact.arch();
            if entries.insert(arch, artefact).is_some() {
                return Err(ArtefactError::DuplicateArchitecture {
                    arch: arch.to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Select the artefact for `arch`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::MissingArtefact`] when the table has no
    /// entry for the architecture.
    pub fn select(&self, arch: Architecture) -> Result<&ReleaseArtifact> {
        self.entries
            .get(&arch)
            .ok_or_else(|| ArtefactError::MissingArtefact {
                arch: arch.to_string(),
            })
    }

    /// Iterate over entries in architecture order.
    pub fn iter(&self) -> impl Iterator<Item = &ReleaseArtifact> {
        self.entries.values()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Select the artefact for `arch` and return an owned copy.
///
/// # Errors
///
/// Returns [`ArtefactError::MissingArtefact`] when the table has no entry
/// for the architecture.
pub fn select_artifact(table: &ReleaseTable, arch: Architecture) -> Result<ReleaseArtifact> {
    table.select(arch).cloned()
}
