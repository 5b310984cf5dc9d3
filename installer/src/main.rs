//! loggar installer CLI entrypoint.
//!
//! This binary downloads the prebuilt `loggar` executable for the host CPU
//! architecture, checks its SHA-256 digest, installs it atomically and runs
//! `loggar version` to confirm it works. The `list` and `verify` subcommands
//! inspect the release table without installing anything.

use clap::Parser;
use log::LevelFilter;
use loggar_installer::cli::{Cli, Command};
use loggar_installer::error::Result;
use loggar_installer::list::run_list;
use loggar_installer::output::write_stderr_line;
use loggar_installer::verify_cmd::run_verify;
use std::io::Write;

mod install_flow;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Some(Command::List(args)) => run_list(args, &mut std::io::stdout()),
        Some(Command::Verify(args)) => run_verify(args, &mut std::io::stdout()),
        Some(Command::Install(_)) | None => {
            install_flow::run_install_command(cli.install_args(), stderr)
        }
    }
}

/// Initialise `env_logger`; `RUST_LOG` takes precedence over the flags.
fn init_logging(cli: &Cli) {
    let args = cli.install_args();
    env_logger::Builder::new()
        .filter_level(log_level(args.verbosity, args.quiet))
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn log_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            err.exit_code()
        }
    }
}
