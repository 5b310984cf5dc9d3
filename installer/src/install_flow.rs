//! Install-flow helpers for the installer binary.
//!
//! This module resolves the manifest, architecture and install target from
//! the command line and hands them to the library pipeline, keeping that
//! orchestration separate from argument parsing in `main.rs`.

use loggar_installer::artefact::arch::Architecture;
use loggar_installer::artefact::download::{ArtefactDownloader, HttpDownloader};
use loggar_installer::cli::InstallArgs;
use loggar_installer::error::Result;
use loggar_installer::manifest::ReleaseManifest;
use loggar_installer::output::{DryRunInfo, ShellSnippet, success_message, write_stderr_line};
use loggar_installer::pipeline::{InstallConfig, InstallReport, plan, run_install};
use loggar_installer::smoke::{CommandExecutor, SMOKE_TEST_TIMEOUT, SystemCommandExecutor};
use loggar_installer::target::{InstallTarget, is_directory_in_path, resolve_bin_dir};
use log::debug;
use std::io::Write;

/// Run the install command against the network and the real process table.
pub(crate) fn run_install_command(args: &InstallArgs, stderr: &mut dyn Write) -> Result<()> {
    let downloader = HttpDownloader::new(args.timeout());
    run_install_command_with(args, &downloader, &SystemCommandExecutor, stderr)
}

/// Testable inner function with injected I/O seams.
pub(crate) fn run_install_command_with(
    args: &InstallArgs,
    downloader: &dyn ArtefactDownloader,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<()> {
    let manifest = ReleaseManifest::resolve(args.manifest.as_deref())?;
    let arch = match args.arch {
        Some(arch) => arch,
        None => Architecture::detect(manifest.os())?,
    };
    let target = resolve_target(args, &manifest)?;
    debug!("installing {} {arch} to {target}", manifest.name());

    let config = InstallConfig {
        manifest: &manifest,
        arch,
        target: &target,
        retry: args.retry_policy(),
        smoke_test: (!args.skip_test).then_some(SMOKE_TEST_TIMEOUT),
        quiet: args.quiet,
    };

    if args.dry_run {
        let artefact = plan(&config)?;
        let install_path = target.path();
        let info = DryRunInfo {
            version: manifest.version(),
            artefact: &artefact,
            install_path: &install_path,
            timeout: args.timeout(),
            retries: args.retries,
            smoke_test: !args.skip_test,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let report = run_install(&config, downloader, executor, stderr)?;
    write_install_summary(args.quiet, &manifest, &target, &report, stderr);
    Ok(())
}

fn resolve_target(args: &InstallArgs, manifest: &ReleaseManifest) -> Result<InstallTarget> {
    let bin_dir = resolve_bin_dir(args.bin_dir.as_deref())?;
    let name = args.name.as_deref().unwrap_or(manifest.binary());
    Ok(InstallTarget::new(bin_dir, name)?)
}

fn write_install_summary(
    quiet: bool,
    manifest: &ReleaseManifest,
    target: &InstallTarget,
    report: &InstallReport,
    stderr: &mut dyn Write,
) {
    if quiet {
        return;
    }

    if let Some(version) = &report.version_output {
        write_stderr_line(stderr, format!("  {version}"));
    }
    write_stderr_line(stderr, "");
    write_stderr_line(
        stderr,
        success_message(target.name(), manifest.version(), &report.path),
    );

    if !is_directory_in_path(target.bin_dir()) {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, ShellSnippet::new(target.bin_dir()).display_text());
    }
}
