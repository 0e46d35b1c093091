//! CLI entrypoint for the Ferry plugin host.
//!
//! The binary delegates to [`ferry_cli::run`], which loads configuration,
//! parses the command line, and lists or runs plugin actions.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    ferry_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
