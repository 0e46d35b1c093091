//! Error types for the CLI runtime.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use ferry_plugins::PluginError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Exit status when a plugin ran and reported failure.
pub(crate) const EXIT_PLUGIN_FAILED: u8 = 1;

/// Exit status when an action could not run at all.
pub(crate) const EXIT_CONFIGURATION: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("plugin execution is disabled; set mcp_enabled = true to allow it")]
    ExecutionDisabled,
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("failed to serialise plugin response: {0}")]
    SerialiseResponse(serde_json::Error),
    #[error("failed to write command output: {0}")]
    WriteOutput(io::Error),
}

impl AppError {
    /// Maps the error to the process exit status.
    pub(crate) fn exit_code(&self) -> ExitCode {
        let could_not_run = match self {
            Self::LoadConfiguration(_) | Self::Telemetry(_) | Self::ExecutionDisabled => true,
            Self::Plugin(error) => error.is_configuration_error(),
            Self::SerialiseResponse(_) | Self::WriteOutput(_) => false,
        };
        if could_not_run {
            ExitCode::from(EXIT_CONFIGURATION)
        } else {
            ExitCode::from(EXIT_PLUGIN_FAILED)
        }
    }
}
