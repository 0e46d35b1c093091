//! Plugin runner orchestrating action execution.
//!
//! The [`PluginRunner`] is the public-facing API the host calls to invoke an
//! action. It resolves the action from the [`PluginRegistry`], checks that the
//! owning plugin's transport is usable, builds the [`RunRequest`], and
//! delegates process handling to a [`PluginExecutor`]. The executor's raw
//! output is then turned into a [`RunResult`].
//!
//! Configuration problems (unknown action, unsupported transport, missing
//! image, unreadable input file) are returned as errors. Everything that goes
//! wrong once the plugin is being launched is reported as a failed
//! [`RunResult`] so the caller sees what the plugin printed.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PluginError;
use crate::extract::extract_response;
use crate::manifest::{Action, DOCKER_STDIO, Plugin};
use crate::protocol::{FilePayload, NO_RESPONSE_MESSAGE, RunRequest, RunResult};
use crate::registry::PluginRegistry;

/// Tracing target for runner operations.
const RUNNER_TARGET: &str = "ferry_plugins::runner";

/// Raw streams captured from one plugin process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    stdout: String,
    stderr: String,
    timed_out: bool,
}

impl ProcessOutput {
    /// Creates output for a process that exited on its own.
    #[must_use]
    pub fn completed(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            timed_out: false,
        }
    }

    /// Creates output for a process killed at its deadline.
    #[must_use]
    pub fn timed_out(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            timed_out: true,
        }
    }

    /// Returns captured stdout text.
    #[must_use]
    pub const fn stdout(&self) -> &str {
        self.stdout.as_str()
    }

    /// Returns captured stderr text.
    #[must_use]
    pub const fn stderr(&self) -> &str {
        self.stderr.as_str()
    }

    /// Returns whether the process was killed at its deadline.
    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        self.timed_out
    }
}

/// Trait abstracting plugin process execution for testability.
///
/// The production implementation is
/// [`DockerStdioExecutor`](crate::process::DockerStdioExecutor). Test code can
/// implement this trait to inject pre-configured output.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use ferry_plugins::runner::{PluginExecutor, ProcessOutput};
/// use ferry_plugins::{Plugin, PluginError};
///
/// struct EchoExecutor;
///
/// impl PluginExecutor for EchoExecutor {
///     fn execute(
///         &self,
///         _plugin: &Plugin,
///         _request_line: &str,
///         _timeout: Duration,
///     ) -> Result<ProcessOutput, PluginError> {
///         Ok(ProcessOutput::completed("{\"ok\": true}\n", ""))
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait PluginExecutor {
    /// Launches the plugin, feeds it `request_line`, and collects its output
    /// within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if the process cannot be spawned or the host
    /// cannot communicate with it.
    fn execute(
        &self,
        plugin: &Plugin,
        request_line: &str,
        timeout: Duration,
    ) -> Result<ProcessOutput, PluginError>;
}

/// Orchestrates action execution by resolving plugins from the registry and
/// delegating to an executor.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use ferry_plugins::runner::{PluginExecutor, ProcessOutput};
/// use ferry_plugins::{Action, Plugin, PluginError, PluginRegistry, PluginRunner, Transport};
///
/// struct EchoExecutor;
/// impl PluginExecutor for EchoExecutor {
///     fn execute(
///         &self,
///         _plugin: &Plugin,
///         _request_line: &str,
///         _timeout: Duration,
///     ) -> Result<ProcessOutput, PluginError> {
///         Ok(ProcessOutput::completed("starting\n{\"ok\": true}\n", ""))
///     }
/// }
///
/// let registry = PluginRegistry::from_plugins(vec![
///     Plugin::new("writer", Transport::docker("acme/writer"))
///         .with_actions(vec![Action::new("refine")]),
/// ]);
/// let runner = PluginRunner::new(registry, EchoExecutor);
/// let result = runner.run("refine", None, Duration::from_secs(5)).unwrap();
/// assert!(result.is_ok());
/// ```
#[derive(Debug)]
pub struct PluginRunner<E> {
    registry: PluginRegistry,
    executor: E,
}

impl<E> PluginRunner<E> {
    /// Creates a runner with the given registry and executor.
    #[must_use]
    pub const fn new(registry: PluginRegistry, executor: E) -> Self {
        Self { registry, executor }
    }

    /// Returns a reference to the plugin registry.
    #[must_use]
    pub const fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}

impl<E: PluginExecutor> PluginRunner<E> {
    /// Resolves `action_key` and invokes it.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ActionNotFound`] when no loaded plugin declares
    /// the action, or any error from [`PluginRunner::execute`].
    pub fn run(
        &self,
        action_key: &str,
        file: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunResult, PluginError> {
        let (plugin, action) =
            self.registry
                .find_action(action_key)
                .ok_or_else(|| PluginError::ActionNotFound {
                    key: action_key.to_owned(),
                })?;
        self.execute(plugin, action, file, timeout)
    }

    /// Invokes `action` of `plugin`, optionally submitting `file`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnsupportedTransport`] or
    /// [`PluginError::MissingImage`] for unusable transports,
    /// [`PluginError::ReadInput`] when `file` cannot be read, and
    /// [`PluginError::SerializeRequest`] when the request cannot be encoded.
    pub fn execute(
        &self,
        plugin: &Plugin,
        action: &Action,
        file: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunResult, PluginError> {
        ensure_transport(plugin)?;

        let mut request = RunRequest::new(action.key());
        if let Some(path) = file {
            request = request.with_file(FilePayload::read(path)?);
        }
        let line = request.to_line()?;

        debug!(
            target: RUNNER_TARGET,
            plugin = plugin.id(),
            action = action.key(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "invoking plugin action"
        );

        let output = match self.executor.execute(plugin, &line, timeout) {
            Ok(output) => output,
            Err(error) => {
                warn!(
                    target: RUNNER_TARGET,
                    plugin = plugin.id(),
                    %error,
                    "plugin could not be executed"
                );
                return Ok(RunResult::failure(String::new(), String::new(), error.to_string()));
            }
        };

        Ok(into_result(plugin, output))
    }
}

/// Rejects transports this host cannot launch.
fn ensure_transport(plugin: &Plugin) -> Result<(), PluginError> {
    let transport = plugin.transport();
    if transport.kind() != DOCKER_STDIO {
        return Err(PluginError::UnsupportedTransport {
            plugin: plugin.id().to_owned(),
            kind: transport.kind().to_owned(),
        });
    }
    if transport.image().is_empty() {
        return Err(PluginError::MissingImage {
            plugin: plugin.id().to_owned(),
        });
    }
    Ok(())
}

/// Decodes process output. Output from a killed process is never decoded,
/// since a partial object must not pass for an answer.
fn into_result(plugin: &Plugin, output: ProcessOutput) -> RunResult {
    let ProcessOutput {
        stdout,
        stderr,
        timed_out,
    } = output;

    if timed_out {
        return RunResult::failure(stdout, stderr, NO_RESPONSE_MESSAGE);
    }

    match extract_response(&stdout) {
        Some(response) => RunResult::from_response(stdout, stderr, response),
        None => {
            debug!(
                target: RUNNER_TARGET,
                plugin = plugin.id(),
                stdout_bytes = stdout.len(),
                "plugin stdout held no JSON object"
            );
            RunResult::failure(stdout, stderr, NO_RESPONSE_MESSAGE)
        }
    }
}
