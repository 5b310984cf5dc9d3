//! Output formatting for the installer CLI.
//!
//! Progress lines go to stderr; this module also renders the shell snippets
//! that put the bin directory on `PATH` and the dry-run summary.

use crate::artefact::release::ReleaseArtifact;
use camino::Utf8Path;
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;

/// Write one line to `stderr`, ignoring failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Shell configuration snippets that add a directory to `PATH`.
#[derive(Debug, Clone)]
pub struct ShellSnippet {
    /// Export line for bash/zsh.
    pub bash: String,
    /// Set line for fish shell.
    pub fish: String,
    /// Set line for PowerShell.
    pub powershell: String,
}

impl ShellSnippet {
    /// Create shell snippets for the given bin directory.
    ///
    /// # Example
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use loggar_installer::output::ShellSnippet;
    ///
    /// let snippet = ShellSnippet::new(&Utf8PathBuf::from("/home/user/.local/bin"));
    /// assert!(snippet.bash.contains("PATH"));
    /// ```
    #[must_use]
    pub fn new(bin_dir: &Utf8Path) -> Self {
        Self {
            bash: format!("export PATH=\"{bin_dir}:$PATH\""),
            fish: format!("fish_add_path \"{bin_dir}\""),
            powershell: format!("$env:PATH = \"{bin_dir};$env:PATH\""),
        }
    }

    /// Format the snippet for display to the user.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!(
            concat!(
                "The install directory is not on your PATH. ",
                "Add the following to your shell configuration:\n\n",
                "  # bash/zsh (~/.bashrc, ~/.zshrc)\n",
                "  {}\n\n",
                "  # fish (~/.config/fish/config.fish)\n",
                "  {}\n\n",
                "  # PowerShell ($PROFILE)\n",
                "  {}"
            ),
            self.bash, self.fish, self.powershell
        )
    }
}

/// Format a success message after installation.
#[must_use]
pub fn success_message(name: &str, version: &str, path: &Utf8Path) -> String {
    format!("Installed {name} {version} to {path}")
}

/// Resolved plan shown by `--dry-run`.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use loggar_installer::artefact::arch::Architecture;
/// use loggar_installer::artefact::release::ReleaseArtifact;
/// use loggar_installer::artefact::sha256_digest::Sha256Digest;
/// use loggar_installer::output::DryRunInfo;
/// use std::time::Duration;
///
/// let artefact = ReleaseArtifact::new(
///     Architecture::Arm64,
///     "https://example.test/loggar_darwin_arm64",
///     Sha256Digest::of(b"binary"),
///     "loggar",
/// );
/// let path = Utf8PathBuf::from("/opt/bin/loggar");
/// let info = DryRunInfo {
///     version: "0.1.0",
///     artefact: &artefact,
///     install_path: &path,
///     timeout: Duration::from_secs(30),
///     retries: 2,
///     smoke_test: true,
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("loggar_darwin_arm64"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Release version.
    pub version: &'a str,
    /// The artefact that would be downloaded.
    pub artefact: &'a ReleaseArtifact,
    /// Where it would be installed.
    pub install_path: &'a Utf8Path,
    /// Download timeout.
    pub timeout: Duration,
    /// Extra download attempts on transient failure.
    pub retries: u32,
    /// Whether the `version` smoke test would run.
    pub smoke_test: bool,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Version: {}", self.version),
            format!("Architecture: {}", self.artefact.arch()),
            format!("URL: {}", self.artefact.url()),
            format!("SHA-256: {}", self.artefact.sha256()),
            format!("Install path: {}", self.install_path),
            format!("Timeout: {}s", self.timeout.as_secs()),
            format!("Retries: {}", self.retries),
            format!("Smoke test: {}", self.smoke_test),
        ]
        .join("\n")
    }
}
