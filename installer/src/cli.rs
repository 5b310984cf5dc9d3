//! CLI argument definitions for the loggar installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::artefact::arch::Architecture;
use crate::artefact::download::{DOWNLOAD_TIMEOUT, RetryPolicy};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Install the prebuilt loggar binary.
#[derive(Parser, Debug)]
#[command(name = "loggar-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the prebuilt loggar binary.\n\n",
    "The installer picks the release artefact for the host CPU architecture, ",
    "downloads it, checks its SHA-256 digest against the release manifest, ",
    "and atomically installs it as an executable. It then runs `loggar version` ",
    "to confirm the binary works on this machine.\n\n",
    "Nothing is written to the install directory unless the digest matches.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  LOGGAR_BIN_DIR            Install directory when --bin-dir is not given\n",
    "  LOGGAR_RELEASE_MANIFEST   Release manifest when --manifest is not given\n",
    "  RUST_LOG                  Log filter (overrides -v)\n\n",
    "EXAMPLES:\n",
    "  Install for the host architecture:\n",
    "    $ loggar-installer\n\n",
    "  Install into a specific directory under another name:\n",
    "    $ loggar-installer --bin-dir /usr/local/bin --name triage\n\n",
    "  Show the release table:\n",
    "    $ loggar-installer list\n\n",
    "  Check a manually downloaded binary:\n",
    "    $ loggar-installer verify ./loggar_darwin_arm64\n\n",
    "  Preview without downloading:\n",
    "    $ loggar-installer --dry-run\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Install arguments (used when no subcommand is given).
    #[command(flatten)]
    pub install: InstallArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install the release binary (default when no subcommand given).
    Install(InstallArgs),
    /// Show the release table.
    List(ListArgs),
    /// Check a local file against the published digest.
    Verify(VerifyArgs),
}

/// Arguments for the install command.
#[derive(Parser, Debug, Clone)]
pub struct InstallArgs {
    /// Architecture to install instead of the detected one.
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<Architecture>,

    /// Directory to install into [default: platform bin directory].
    #[arg(short, long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Executable name [default: from the release manifest].
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Release manifest to read instead of the built-in one.
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,

    /// Download timeout in seconds.
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DOWNLOAD_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Extra download attempts after a transient network failure.
    #[arg(long, value_name = "N", default_value_t = RetryPolicy::default().retries)]
    pub retries: u32,

    /// Skip running `<binary> version` after installing.
    #[arg(long)]
    pub skip_test: bool,

    /// Show the resolved plan and exit without downloading.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Arguments for the list command.
#[derive(Parser, Debug, Clone, Default)]
pub struct ListArgs {
    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,

    /// Release manifest to read instead of the built-in one.
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,
}

/// Arguments for the verify command.
#[derive(Parser, Debug, Clone)]
pub struct VerifyArgs {
    /// The file to check.
    #[arg(value_name = "FILE")]
    pub file: Utf8PathBuf,

    /// Architecture whose digest to check against [default: detected].
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<Architecture>,

    /// Release manifest to read instead of the built-in one.
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,
}

impl InstallArgs {
    /// The download retry policy requested on the command line.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            ..RetryPolicy::default()
        }
    }

    /// The download timeout requested on the command line.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for InstallArgs {
    /// Creates an `InstallArgs` matching a bare `loggar-installer` invocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use loggar_installer::cli::InstallArgs;
    ///
    /// let args = InstallArgs::default();
    /// assert_eq!(args.timeout, 30);
    /// assert!(!args.skip_test);
    /// ```
    fn default() -> Self {
        Self {
            arch: None,
            bin_dir: None,
            name: None,
            manifest: None,
            timeout: DOWNLOAD_TIMEOUT.as_secs(),
            retries: RetryPolicy::default().retries,
            skip_test: false,
            dry_run: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

impl Cli {
    /// Returns the effective install arguments.
    ///
    /// If an `Install` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened install arguments.
    #[must_use]
    pub fn install_args(&self) -> &InstallArgs {
        match &self.command {
            Some(Command::Install(args)) => args,
            Some(Command::List(_) | Command::Verify(_)) | None => &self.install,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
