//! CLI argument definitions for the Ferry plugin host.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line interface for the Ferry plugin host.
#[derive(Parser, Debug)]
#[command(
    name = "ferry",
    version,
    about = "Run containerised plugin actions over JSON stdio",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Structured subcommands for the Ferry CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Lists loaded plugins and the actions they provide.
    List,
    /// Runs one plugin action.
    Run(RunArgs),
}

/// Arguments accepted by `ferry run`.
#[derive(Args, Debug, Clone)]
pub(crate) struct RunArgs {
    /// Action key to invoke (for example `refine`).
    #[arg(value_name = "ACTION")]
    pub(crate) action: String,
    /// File whose content is sent to the plugin.
    #[arg(long, short = 'f', value_name = "PATH")]
    pub(crate) file: Option<PathBuf>,
    /// Overrides the configured timeout, in seconds.
    #[arg(long, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,
}
