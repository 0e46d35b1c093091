//! Implementations of the `list` and `run` commands.

use std::io::Write;
use std::path::{self, Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use ferry_config::Config;
use ferry_plugins::{
    DockerStdioExecutor, PluginError, PluginRegistry, PluginRunner, RunResult, apply_output,
};
use tracing::info;

use crate::cli::RunArgs;
use crate::errors::{AppError, EXIT_PLUGIN_FAILED};

/// Tracing target for CLI commands.
const COMMAND_TARGET: &str = "ferry_cli::commands";

/// Prints every loaded plugin with its actions.
pub(crate) fn list<W: Write>(config: &Config, stdout: &mut W) -> Result<ExitCode, AppError> {
    let folder = config.mcp_folder();
    let registry = PluginRegistry::load(folder);

    if registry.is_empty() {
        writeln!(stdout, "No plugins found in {folder}.").map_err(AppError::WriteOutput)?;
        return Ok(ExitCode::SUCCESS);
    }

    writeln!(stdout, "Loaded plugins (folder: {folder})").map_err(AppError::WriteOutput)?;
    for plugin in registry.plugins() {
        writeln!(
            stdout,
            " - {} :: {} v{}",
            plugin.id(),
            plugin.name(),
            plugin.version()
        )
        .map_err(AppError::WriteOutput)?;
        for action in plugin.actions() {
            writeln!(stdout, "    * {} \u{2014} {}", action.key(), action.title())
                .map_err(AppError::WriteOutput)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs one action and applies its output rule.
pub(crate) fn run<W: Write, E: Write>(
    config: &Config,
    args: &RunArgs,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<ExitCode, AppError> {
    if !config.mcp_enabled() {
        return Err(AppError::ExecutionDisabled);
    }

    let registry = PluginRegistry::load(config.mcp_folder());
    let executor = DockerStdioExecutor::new().with_runtime(config.container_runtime());
    let runner = PluginRunner::new(registry, executor);
    let (plugin, action) =
        runner
            .registry()
            .find_action(&args.action)
            .ok_or_else(|| PluginError::ActionNotFound {
                key: args.action.clone(),
            })?;

    let file = args.file.as_deref().map(resolve);
    let timeout = args
        .timeout
        .map_or_else(|| config.timeout(), Duration::from_secs);

    let result = runner.execute(plugin, action, file.as_deref(), timeout)?;
    report_stderr(&result, stderr)?;

    if !result.is_ok() {
        writeln!(stderr, "Plugin returned ok=false.").map_err(AppError::WriteOutput)?;
        let rendered =
            serde_json::to_string_pretty(result.response()).map_err(AppError::SerialiseResponse)?;
        writeln!(stdout, "{rendered}").map_err(AppError::WriteOutput)?;
        return Ok(ExitCode::from(EXIT_PLUGIN_FAILED));
    }

    let changed = apply_output(action, &result, file.as_deref())?;
    info!(
        target: COMMAND_TARGET,
        plugin = plugin.id(),
        action = action.key(),
        modified = changed.is_some(),
        "plugin action completed"
    );
    writeln!(stdout, "Plugin executed successfully.").map_err(AppError::WriteOutput)?;
    match changed {
        Some(path) => writeln!(stdout, "Updated file: {}", path.display()),
        None => writeln!(stdout, "No file was modified by output rules."),
    }
    .map_err(AppError::WriteOutput)?;
    Ok(ExitCode::SUCCESS)
}

fn report_stderr<E: Write>(result: &RunResult, stderr: &mut E) -> Result<(), AppError> {
    let text = result.stderr().trim();
    if text.is_empty() {
        return Ok(());
    }
    writeln!(stderr, "Plugin stderr:").map_err(AppError::WriteOutput)?;
    writeln!(stderr, "{text}").map_err(AppError::WriteOutput)
}

/// Makes `path` absolute so the plugin sees where the file lives.
fn resolve(path: &Path) -> PathBuf {
    path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
