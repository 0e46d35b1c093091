//! Shared configuration for the Ferry plugin host.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then a TOML
//! file (`--config-path` or `FERRY_CONFIG_PATH`), then `FERRY_*` environment
//! variables, then command-line flags. Later layers win.
//!
//! Plugin execution is disabled unless `mcp_enabled` is set, so a project
//! must opt in before any container is launched.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_CONTAINER_RUNTIME, DEFAULT_LOG_FILTER, DEFAULT_MCP_FOLDER, DEFAULT_TIMEOUT_SECS,
    default_container_runtime, default_log_filter, default_log_filter_string, default_log_format,
    default_mcp_enabled, default_mcp_folder, default_timeout_secs,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use ortho_config::OrthoConfig;

/// Resolved host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "FERRY")]
pub struct Config {
    /// Whether plugin actions may be executed at all.
    ///
    /// `None` until a layer sets it; read through [`Config::mcp_enabled`].
    pub mcp_enabled: Option<bool>,
    /// Directory holding plugin manifests.
    #[ortho_config(default = default_mcp_folder())]
    pub mcp_folder: Utf8PathBuf,
    /// Wall-clock budget for one plugin run, in seconds.
    #[ortho_config(default = default_timeout_secs())]
    pub timeout_secs: u64,
    /// Container runtime binary with a docker-compatible `run` command.
    #[ortho_config(default = default_container_runtime())]
    pub container_runtime: String,
    /// `tracing` filter directive for host logs.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for host logs.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mcp_enabled: None,
            mcp_folder: default_mcp_folder(),
            timeout_secs: default_timeout_secs(),
            container_runtime: default_container_runtime(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Returns whether plugin actions may be executed.
    #[must_use]
    pub const fn mcp_enabled(&self) -> bool {
        match self.mcp_enabled {
            Some(enabled) => enabled,
            None => default_mcp_enabled(),
        }
    }

    /// Returns the manifest directory.
    #[must_use]
    pub fn mcp_folder(&self) -> &Utf8Path {
        self.mcp_folder.as_path()
    }

    /// Returns the per-run timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the container runtime binary.
    #[must_use]
    pub const fn container_runtime(&self) -> &str {
        self.container_runtime.as_str()
    }

    /// Returns the log filter directive.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
