//! Output formatting for the release table.
//!
//! This module renders a [`ReleaseManifest`] for human-readable or JSON
//! output. The host architecture, when known, is marked in both forms.

use serde::Serialize;

use crate::artefact::arch::Architecture;
use crate::manifest::ReleaseManifest;

/// Format the release table for human-readable output.
///
/// # Examples
///
/// ```
/// use loggar_installer::artefact::arch::Architecture;
/// use loggar_installer::list_output::format_human;
/// use loggar_installer::manifest::ReleaseManifest;
///
/// let manifest = ReleaseManifest::embedded().expect("embedded manifest is valid");
/// let output = format_human(&manifest, Some(Architecture::Arm64));
/// assert!(output.contains("arm64 (host)"));
/// ```
#[must_use]
pub fn format_human(manifest: &ReleaseManifest, host: Option<Architecture>) -> String {
    let mut output = format!("{} {}", manifest.name(), manifest.version());
    if let Some(description) = manifest.description() {
        output.push_str(&format!(" - {description}"));
    }
    output.push('\n');

    if let Some(homepage) = manifest.homepage() {
        output.push_str(&format!("Homepage: {homepage}\n"));
    }
    output.push_str(&format!("Binary: {}\n", manifest.binary()));
    output.push_str("\nArtifacts:\n");

    for artefact in manifest.table().iter() {
        let host_marker = if host == Some(artefact.arch()) {
            " (host)"
        } else {
            ""
        };
        output.push_str(&format!("  {}{host_marker}\n", artefact.arch()));
        output.push_str(&format!("    URL: {}\n", artefact.url()));
        output.push_str(&format!("    SHA-256: {}\n", artefact.sha256()));
    }

    output
}

/// Format the release table as JSON.
///
/// # Examples
///
/// ```
/// use loggar_installer::list_output::format_json;
/// use loggar_installer::manifest::ReleaseManifest;
///
/// let manifest = ReleaseManifest::embedded().expect("embedded manifest is valid");
/// let json = format_json(&manifest, None);
/// assert!(json.contains("\"artifacts\""));
/// ```
#[must_use]
pub fn format_json(manifest: &ReleaseManifest, host: Option<Architecture>) -> String {
    let json_data = ReleaseJson::from_manifest(manifest, host);

    serde_json::to_string_pretty(&json_data).unwrap_or_else(|_| "{}".to_owned())
}

/// JSON-serializable representation of a release.
#[derive(Debug, Serialize)]
pub struct ReleaseJson<'a> {
    /// Product name.
    pub name: &'a str,
    /// Release version.
    pub version: &'a str,
    /// One-line description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    /// Project homepage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<&'a str>,
    /// Installed executable name.
    pub binary: &'a str,
    /// One entry per architecture.
    pub artifacts: Vec<ArtifactEntry<'a>>,
}

impl<'a> ReleaseJson<'a> {
    fn from_manifest(manifest: &'a ReleaseManifest, host: Option<Architecture>) -> Self {
        let artifacts = manifest
            .table()
            .iter()
            .map(|artefact| ArtifactEntry {
                arch: artefact.arch(),
                url: artefact.url(),
                sha256: artefact.sha256().as_str(),
                asset: artefact.asset_name(),
                host: host == Some(artefact.arch()),
            })
            .collect();

        Self {
            name: manifest.name(),
            version: manifest.version(),
            description: manifest.description(),
            homepage: manifest.homepage(),
            binary: manifest.binary(),
            artifacts,
        }
    }
}

/// JSON entry for one artefact.
#[derive(Debug, Serialize)]
pub struct ArtifactEntry<'a> {
    /// Target architecture.
    pub arch: Architecture,
    /// Download URL.
    pub url: &'a str,
    /// Expected SHA-256 digest.
    pub sha256: &'a str,
    /// File name of the release asset.
    pub asset: &'a str,
    /// Whether this entry matches the host.
    pub host: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{manifest_toml, sha256_hex};

    fn sample_manifest() -> ReleaseManifest {
        let arm = sha256_hex(b"arm");
        let amd = sha256_hex(b"amd");
        let source = manifest_toml(
            "loggar",
            &[
                ("arm64", "https://example.test/loggar_darwin_arm64", arm.as_str()),
                ("amd64", "https://example.test/loggar_darwin_amd64", amd.as_str()),
            ],
        );
        ReleaseManifest::parse(&source, "test").expect("valid manifest")
    }

    #[test]
    fn format_human_lists_every_architecture() {
        let output = format_human(&sample_manifest(), None);

        assert!(output.contains("Artifacts:"));
        assert!(output.contains("  arm64\n"));
        assert!(output.contains("  amd64\n"));
        assert!(output.contains("https://example.test/loggar_darwin_arm64"));
        assert!(output.contains(&sha256_hex(b"amd")));
    }

    #[test]
    fn format_human_marks_host_architecture() {
        let output = format_human(&sample_manifest(), Some(Architecture::Amd64));

        assert!(output.contains("amd64 (host)"));
        assert!(!output.contains("arm64 (host)"));
    }

    #[test]
    fn format_human_shows_embedded_release_details() {
        let manifest = ReleaseManifest::embedded().expect("embedded manifest");
        let output = format_human(&manifest, None);

        assert!(output.starts_with("loggar 0.1.0 - AI-powered log triage CLI"));
        assert!(output.contains("Homepage: https://loggar.dev"));
        assert!(output.contains("Binary: loggar"));
    }

    #[test]
    fn format_json_includes_all_fields() {
        let json = format_json(&sample_manifest(), Some(Architecture::Arm64));

        assert!(json.contains("\"artifacts\""));
        assert!(json.contains("\"arch\": \"arm64\""));
        assert!(json.contains("\"asset\": \"loggar_darwin_arm64\""));
        assert!(json.contains("\"host\": true"));
        assert!(json.contains("\"binary\": \"loggar\""));
    }

    #[test]
    fn format_json_is_valid_json() {
        let json = format_json(&sample_manifest(), None);

        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should be valid JSON");
        let artifacts = parsed
            .get("artifacts")
            .and_then(serde_json::Value::as_array)
            .expect("artifacts array");
        assert_eq!(artifacts.len(), 2);
        assert!(
            artifacts
                .iter()
                .all(|entry| entry.get("host") == Some(&serde_json::Value::Bool(false)))
        );
    }
}
