//! Behaviour-driven tests for the install pipeline.
//!
//! These scenarios drive `run_install` with a stub downloader and a real
//! filesystem, and on Unix run the installed script for the smoke test.

use camino::Utf8PathBuf;
use loggar_installer::artefact::arch::Architecture;
use loggar_installer::artefact::download::RetryPolicy;
use loggar_installer::error::InstallerError;
use loggar_installer::manifest::ReleaseManifest;
use loggar_installer::pipeline::{InstallConfig, InstallReport, run_install};
use loggar_installer::smoke::{SMOKE_TEST_TIMEOUT, SystemCommandExecutor};
use loggar_installer::target::InstallTarget;
use loggar_installer::test_utils::{StubDownloader, StubResponse, manifest_toml, sha256_hex};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::time::Duration;
use tempfile::TempDir;

const ARM_URL: &str =
    "https://github.com/AyomiCoder/loggar/releases/download/v0.1.0/loggar_darwin_arm64";
const WORKING_BINARY: &[u8] = b"#!/bin/sh\necho \"loggar 0.1.0\"\n";
const TAMPERED_BINARY: &[u8] = b"#!/bin/sh\necho \"pwned\"\n";
const PREVIOUS_BINARY: &[u8] = b"#!/bin/sh\necho \"loggar 0.0.9\"\n";
const BROKEN_BINARY: &[u8] = b"#!/bin/sh\necho \"dyld: missing symbol\" >&2\nexit 134\n";

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Default)]
struct InstallWorld {
    manifest: Option<ReleaseManifest>,
    served: Vec<u8>,
    transient_failures: u32,
    temp_dir: Option<TempDir>,
    bin_dir: Option<Utf8PathBuf>,
    requests: Vec<String>,
    result: Option<Result<InstallReport, InstallerError>>,
}

impl InstallWorld {
    fn bin_dir(&self) -> &Utf8PathBuf {
        self.bin_dir.as_ref().expect("bin directory not set")
    }

    fn install_path(&self) -> Utf8PathBuf {
        self.bin_dir().join("loggar")
    }

    fn report(&self) -> &InstallReport {
        match self.result.as_ref().expect("installer has not run") {
            Ok(report) => report,
            Err(err) => panic!("expected install to succeed, got: {err}"),
        }
    }

    fn error(&self) -> &InstallerError {
        match self.result.as_ref().expect("installer has not run") {
            Ok(report) => panic!("expected install to fail, got: {report:?}"),
            Err(err) => err,
        }
    }

    fn downloader(&self) -> StubDownloader {
        let mut downloader = StubDownloader::new();
        for _ in 0..self.transient_failures {
            downloader = downloader.with_response(ARM_URL, StubResponse::Status(503));
        }
        downloader.with_response(ARM_URL, StubResponse::Body(self.served.clone()))
    }

    fn run(&mut self, arch: Architecture) {
        let manifest = self.manifest.as_ref().expect("release table not set");
        let target = InstallTarget::new(self.bin_dir().clone(), manifest.binary())
            .expect("valid target");
        let config = InstallConfig {
            manifest,
            arch,
            target: &target,
            retry: RetryPolicy {
                retries: 2,
                backoff: Duration::ZERO,
            },
            smoke_test: cfg!(unix).then_some(SMOKE_TEST_TIMEOUT),
            quiet: true,
        };
        let downloader = self.downloader();
        let mut stderr = Vec::new();

        let result = run_install(&config, &downloader, &SystemCommandExecutor, &mut stderr);

        self.requests = downloader.requests();
        self.result = Some(result);
    }
}

#[fixture]
fn world() -> InstallWorld {
    InstallWorld::default()
}

/// A one-entry release table publishing the digest of `published`.
fn release_table(published: &[u8]) -> ReleaseManifest {
    let digest = sha256_hex(published);
    let source = manifest_toml("loggar", &[("arm64", ARM_URL, digest.as_str())]);
    ReleaseManifest::parse(&source, "behaviour test").expect("valid manifest")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a release table serving a working loggar binary for arm64")]
fn given_working_release(world: &mut InstallWorld) {
    world.manifest = Some(release_table(WORKING_BINARY));
    world.served = WORKING_BINARY.to_vec();
}

#[given("a release table serving a broken loggar binary for arm64")]
fn given_broken_release(world: &mut InstallWorld) {
    world.manifest = Some(release_table(BROKEN_BINARY));
    world.served = BROKEN_BINARY.to_vec();
}

#[given("a release table serving a tampered binary for arm64")]
fn given_tampered_release(world: &mut InstallWorld) {
    world.manifest = Some(release_table(WORKING_BINARY));
    world.served = TAMPERED_BINARY.to_vec();
}

#[given("the first download attempt fails with status {status}")]
fn given_transient_failure(world: &mut InstallWorld, status: u16) {
    assert!(status >= 500, "only server errors are retried");
    world.transient_failures = 1;
}

#[given("an empty bin directory")]
fn given_empty_bin_dir(world: &mut InstallWorld) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let bin_dir = Utf8PathBuf::try_from(temp_dir.path().join("bin")).expect("non-UTF8 temp path");
    world.bin_dir = Some(bin_dir);
    world.temp_dir = Some(temp_dir);
}

#[given("a bin directory containing a previous loggar binary")]
fn given_previous_install(world: &mut InstallWorld) {
    given_empty_bin_dir(world);
    std::fs::create_dir_all(world.bin_dir()).expect("failed to create bin dir");
    std::fs::write(world.install_path(), PREVIOUS_BINARY).expect("failed to seed binary");
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the installer runs for {arch}")]
fn when_installer_runs(world: &mut InstallWorld, arch: String) {
    let arch = arch.parse::<Architecture>().expect("known architecture");
    world.run(arch);
}

#[when("the installer is run again for {arch}")]
fn when_installer_runs_again(world: &mut InstallWorld, arch: String) {
    when_installer_runs(world, arch);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the requested URL ends with \"{suffix}\"")]
fn then_url_ends_with(world: &mut InstallWorld, suffix: String) {
    let report = world.report();
    assert!(report.artefact.url().ends_with(&suffix));
    assert_eq!(world.requests, vec![report.artefact.url().to_owned()]);
    let published = world
        .manifest
        .as_ref()
        .expect("release table not set")
        .table()
        .select(Architecture::Arm64)
        .expect("arm64 entry");
    assert_eq!(report.artefact.sha256(), published.sha256());
}

#[then("the binary is installed as \"{name}\"")]
fn then_installed_as(world: &mut InstallWorld, name: String) {
    let report = world.report();
    assert_eq!(report.path, world.bin_dir().join(&name));
    assert_eq!(
        std::fs::read(&report.path).expect("installed file"),
        WORKING_BINARY
    );
}

#[then("the installed binary is executable")]
fn then_installed_executable(world: &mut InstallWorld) {
    let path = &world.report().path;
    assert!(path.is_file());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = std::fs::metadata(path)
            .expect("installed file metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[then("the smoke test reports \"{expected}\"")]
fn then_smoke_test_reports(world: &mut InstallWorld, expected: String) {
    let report = world.report();
    if cfg!(unix) {
        assert_eq!(report.version_output.as_deref(), Some(expected.as_str()));
    } else {
        assert!(report.version_output.is_none());
    }
}

#[then("the install fails with an integrity mismatch")]
fn then_integrity_mismatch(world: &mut InstallWorld) {
    let err = world.error();
    assert!(
        matches!(err, InstallerError::IntegrityMismatch(_)),
        "expected IntegrityMismatch, got {err:?}"
    );
    assert_eq!(err.exit_code(), 5);
}

#[then("the install fails with an unsupported architecture error")]
fn then_unsupported_architecture(world: &mut InstallWorld) {
    let err = world.error();
    assert!(
        matches!(err, InstallerError::UnsupportedArchitecture(_)),
        "expected UnsupportedArchitecture, got {err:?}"
    );
    assert_eq!(err.exit_code(), 3);
}

#[then("the install fails with a smoke test error")]
fn then_smoke_test_error(world: &mut InstallWorld) {
    let err = world.error();
    assert!(
        matches!(err, InstallerError::SmokeTestFailed { .. }),
        "expected SmokeTestFailed, got {err:?}"
    );
    assert!(err.to_string().contains("missing symbol"), "got: {err}");
    assert_eq!(err.exit_code(), 7);
}

#[then("no file exists at the install path")]
fn then_no_file(world: &mut InstallWorld) {
    assert!(!world.install_path().exists());
    assert!(!world.bin_dir().exists(), "bin directory should not be created");
}

#[then("the previous binary is unchanged")]
fn then_previous_unchanged(world: &mut InstallWorld) {
    assert_eq!(
        std::fs::read(world.install_path()).expect("previous binary"),
        PREVIOUS_BINARY
    );
}

#[then("nothing was downloaded")]
fn then_nothing_downloaded(world: &mut InstallWorld) {
    assert!(world.requests.is_empty());
}

#[then("the artefact was requested {count} times")]
fn then_requested_times(world: &mut InstallWorld, count: usize) {
    assert_eq!(world.requests.len(), count);
}

#[then("the bin directory contains only \"{name}\"")]
fn then_bin_dir_contains_only(world: &mut InstallWorld, name: String) {
    let entries: Vec<String> = std::fs::read_dir(world.bin_dir())
        .expect("bin directory")
        .map(|entry| {
            entry
                .expect("directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(entries, vec![name]);
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/install.feature",
    name = "Install the arm64 release end to end"
)]
fn scenario_install_arm64_end_to_end(world: InstallWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install.feature",
    name = "Reject a download whose digest does not match"
)]
fn scenario_reject_digest_mismatch(world: InstallWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install.feature",
    name = "Keep the previous binary when verification fails"
)]
fn scenario_keep_previous_binary(world: InstallWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install.feature",
    name = "Refuse an architecture with no release artefact"
)]
fn scenario_refuse_missing_architecture(world: InstallWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install.feature",
    name = "Retry a transient download failure"
)]
fn scenario_retry_transient_failure(world: InstallWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/install.feature",
    name = "Reinstalling leaves no temporary files"
)]
fn scenario_reinstall_leaves_no_temp_files(world: InstallWorld) {
    let _ = world;
}

// The smoke test only runs on Unix hosts.
#[cfg(unix)]
#[scenario(
    path = "tests/features/install.feature",
    name = "Keep the previous binary when the new one fails its smoke test"
)]
fn scenario_keep_previous_on_smoke_failure(world: InstallWorld) {
    let _ = world;
}
