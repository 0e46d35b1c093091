//! Configuration loading helpers for the Ferry CLI.
//!
//! Leading configuration flags are routed to `ortho_config`; the remaining
//! tokens form the command parsed by `clap`.

use std::ffi::{OsStr, OsString};

use ferry_config::{Config, OrthoConfig as _};

use crate::errors::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Each takes a value, either inline (`--log-filter=debug`) or as the next
/// argument. Keep in sync with the fields of [`Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--mcp-folder",
    "--timeout-secs",
    "--container-runtime",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name and leading config flags.
    ///
    /// Configuration flags must appear before the command. Flags after it
    /// belong to the command.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments split between the configuration loader and the command parser.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

/// Splits `args` into leading configuration flags and the command.
///
/// Both halves keep the program name so each parser sees a complete argv.
pub(crate) fn split_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter().peekable();
    while let Some(argument) = remaining.next_if(|arg| classify(arg) != FlagAction::Stop) {
        config_arguments.push(argument.clone());
        if classify(argument) == (FlagAction::Include { needs_value: true }) {
            if let Some(value) = remaining.next() {
                config_arguments.push(value.clone());
            }
        }
    }

    let mut command_arguments = vec![program.clone()];
    command_arguments.extend(remaining.cloned());
    ArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case::inline("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case::separate("--log-filter", FlagAction::Include { needs_value: true })]
    #[case::command("run", FlagAction::Stop)]
    #[case::unknown("--file", FlagAction::Stop)]
    fn classifies_flags(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify(OsStr::new(argument)), expected);
    }

    #[test]
    fn leading_config_flags_are_routed_to_loader() {
        let split = split_arguments(&os(&[
            "ferry",
            "--config-path",
            "ferry.toml",
            "--log-format=json",
            "run",
            "refine",
            "--timeout",
            "5",
        ]));
        assert_eq!(
            split.config_arguments,
            os(&["ferry", "--config-path", "ferry.toml", "--log-format=json"])
        );
        assert_eq!(
            split.command_arguments,
            os(&["ferry", "run", "refine", "--timeout", "5"])
        );
    }

    #[test]
    fn config_flags_after_the_command_stay_with_it() {
        let split = split_arguments(&os(&["ferry", "list", "--log-filter", "debug"]));
        assert_eq!(split.config_arguments, os(&["ferry"]));
        assert_eq!(
            split.command_arguments,
            os(&["ferry", "list", "--log-filter", "debug"])
        );
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        assert_eq!(split_arguments(&[]), ArgumentSplit::default());
    }
}
