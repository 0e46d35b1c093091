//! Domain errors raised by plugin operations.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint.
//!
//! Only failures the caller must act on surface here. Malformed manifests are
//! dropped during loading and runtime faults of a plugin process are folded
//! into a failed [`RunResult`](crate::protocol::RunResult) instead.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising from plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// No loaded plugin declares the requested action.
    #[error("action '{key}' not found in registry")]
    ActionNotFound {
        /// Action key that was looked up.
        key: String,
    },

    /// The plugin declares a transport kind this host cannot drive.
    #[error("plugin '{plugin}' uses unsupported transport '{kind}'")]
    UnsupportedTransport {
        /// Plugin identity.
        plugin: String,
        /// Transport kind declared in the manifest.
        kind: String,
    },

    /// The plugin transport does not name a container image.
    #[error("plugin '{plugin}' has no container image configured for docker-stdio")]
    MissingImage {
        /// Plugin identity.
        plugin: String,
    },

    /// The file submitted as action input could not be read.
    #[error("failed to read input file {}: {source}", path.display())]
    ReadInput {
        /// Path of the submitted file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The action output could not be written back to the input file.
    #[error("failed to write output to {}: {source}", path.display())]
    WriteOutput {
        /// Path of the file being overwritten.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The plugin request could not be serialised to JSON.
    #[error("failed to serialise plugin request: {0}")]
    SerializeRequest(#[source] serde_json::Error),

    /// The plugin process could not be spawned.
    #[error("plugin '{plugin}' failed to start: {message}")]
    SpawnFailed {
        /// Plugin identity.
        plugin: String,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<std::io::Error>>,
    },

    /// An I/O error occurred while communicating with the plugin process.
    #[error("I/O error communicating with plugin '{plugin}': {source}")]
    Io {
        /// Plugin identity.
        plugin: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PluginError {
    /// Returns `true` when the error means the plugin could not run at all
    /// because of how it, or the request, was configured.
    ///
    /// Callers use this to keep "broken setup" apart from "plugin ran and
    /// failed" when mapping errors to exit codes.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ActionNotFound { .. }
                | Self::UnsupportedTransport { .. }
                | Self::MissingImage { .. }
                | Self::ReadInput { .. }
        )
    }
}

#[cfg(test)]
mod tests;
