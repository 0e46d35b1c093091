use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Directory, relative to the working directory, holding plugin manifests.
pub const DEFAULT_MCP_FOLDER: &str = "mcps";

/// Wall-clock budget for one plugin run, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Container runtime binary used to launch plugins.
pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Plugin execution stays off until a project opts in.
#[must_use]
pub const fn default_mcp_enabled() -> bool {
    false
}

/// Default manifest directory.
#[must_use]
pub fn default_mcp_folder() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_MCP_FOLDER)
}

/// Default plugin timeout in seconds.
#[must_use]
pub const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Owned container runtime name used where allocation is required.
#[must_use]
pub fn default_container_runtime() -> String {
    String::from(DEFAULT_CONTAINER_RUNTIME)
}

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    String::from(DEFAULT_LOG_FILTER)
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
