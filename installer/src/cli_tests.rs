//! Tests for installer CLI parsing and default behaviours.

use super::*;
use clap::CommandFactory;
use rstest::rstest;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["loggar-installer"]);
    assert!(cli.command.is_none());
    assert!(cli.install.arch.is_none());
    assert!(cli.install.bin_dir.is_none());
    assert!(cli.install.name.is_none());
    assert!(cli.install.manifest.is_none());
    assert_eq!(cli.install.timeout, 30);
    assert_eq!(cli.install.retries, 2);
    assert!(!cli.install.skip_test);
    assert!(!cli.install.dry_run);
    assert_eq!(cli.install.verbosity, 0);
    assert!(!cli.install.quiet);
}

#[rstest]
#[case::arm64("arm64", Architecture::Arm64)]
#[case::aarch64("aarch64", Architecture::Arm64)]
#[case::amd64("amd64", Architecture::Amd64)]
fn cli_parses_arch(#[case] value: &str, #[case] expected: Architecture) {
    let cli = Cli::parse_from(["loggar-installer", "--arch", value]);
    assert_eq!(cli.install.arch, Some(expected));
}

#[test]
fn cli_rejects_unknown_arch() {
    let result = Cli::try_parse_from(["loggar-installer", "--arch", "armv7"]);
    assert!(result.is_err());
}

#[test]
fn cli_parses_bin_dir_and_name() {
    let cli = Cli::parse_from([
        "loggar-installer",
        "-b",
        "/usr/local/bin",
        "--name",
        "triage",
    ]);
    assert_eq!(cli.install.bin_dir, Some(Utf8PathBuf::from("/usr/local/bin")));
    assert_eq!(cli.install.name.as_deref(), Some("triage"));
}

#[test]
fn cli_parses_timeout_and_retries() {
    let cli = Cli::parse_from(["loggar-installer", "--timeout", "5", "--retries", "0"]);
    assert_eq!(cli.install.timeout(), Duration::from_secs(5));
    assert_eq!(cli.install.retry_policy().retries, 0);
}

#[rstest]
#[case::zero("0")]
#[case::negative("-1")]
fn cli_rejects_non_positive_timeout(#[case] value: &str) {
    let err = Cli::try_parse_from(["loggar-installer", "--timeout", value])
        .expect_err("timeout must be at least one second");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn quiet_and_verbose_conflict() {
    let result = Cli::try_parse_from(["loggar-installer", "-q", "-v"]);
    assert!(result.is_err());
}

#[test]
fn cli_counts_verbosity() {
    let cli = Cli::parse_from(["loggar-installer", "-vvv"]);
    assert_eq!(cli.install.verbosity, 3);
}

#[test]
fn cli_parses_list_with_json() {
    let cli = Cli::parse_from(["loggar-installer", "list", "--json"]);
    match cli.command {
        Some(Command::List(args)) => assert!(args.json),
        _ => panic!("expected List command"),
    }
}

#[test]
fn cli_parses_verify() {
    let cli = Cli::parse_from([
        "loggar-installer",
        "verify",
        "./loggar_darwin_arm64",
        "--arch",
        "arm64",
    ]);
    match cli.command {
        Some(Command::Verify(args)) => {
            assert_eq!(args.file, Utf8PathBuf::from("./loggar_darwin_arm64"));
            assert_eq!(args.arch, Some(Architecture::Arm64));
        }
        _ => panic!("expected Verify command"),
    }
}

#[test]
fn install_args_prefers_subcommand_arguments() {
    let cli = Cli::parse_from(["loggar-installer", "install", "--skip-test"]);
    assert!(cli.install_args().skip_test);
    assert!(!cli.install.skip_test);
}

#[test]
fn install_args_falls_back_to_flattened_arguments() {
    let cli = Cli::parse_from(["loggar-installer", "--dry-run"]);
    assert!(cli.install_args().dry_run);
}

#[test]
fn default_install_args_match_bare_invocation() {
    let parsed = Cli::parse_from(["loggar-installer"]).install;
    let defaults = InstallArgs::default();
    assert_eq!(parsed.timeout, defaults.timeout);
    assert_eq!(parsed.retries, defaults.retries);
    assert_eq!(parsed.skip_test, defaults.skip_test);
}
