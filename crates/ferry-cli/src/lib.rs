//! Command-line interface runtime for the Ferry plugin host.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! set-up, and exit-code mapping. The interface is designed to be exercised
//! both from the binary entrypoint and from tests where configuration loading
//! and IO streams can be substituted.
//!
//! Exit statuses: `0` on success, `1` when a plugin ran and reported failure,
//! and `2` when an action could not run at all (disabled execution, unknown
//! action, broken manifest, bad configuration or usage).

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod config;
mod errors;
mod telemetry;

use cli::{Cli, CliCommand};
use config::{ConfigLoader, OrthoConfigLoader, split_arguments};
use errors::EXIT_CONFIGURATION;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_arguments(&args);

    let cli = match Cli::try_parse_from(split.command_arguments) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| {
            telemetry::initialise(&config)?;
            Ok(config)
        })
        .and_then(|config| match &cli.command {
            CliCommand::List => commands::list(&config, stdout),
            CliCommand::Run(run_args) => commands::run(&config, run_args, stdout, stderr),
        });

    match result {
        Ok(exit_code) => exit_code,
        Err(error) => {
            drop(writeln!(stderr, "{error}"));
            error.exit_code()
        }
    }
}

/// Prints help and version requests to stdout and usage errors to stderr.
fn report_usage<W: Write, E: Write>(
    error: &clap::Error,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    let rendered = error.render();
    if error.use_stderr() {
        drop(write!(stderr, "{rendered}"));
        ExitCode::from(EXIT_CONFIGURATION)
    } else {
        drop(write!(stdout, "{rendered}"));
        ExitCode::SUCCESS
    }
}
