//! Plugin registry and action execution engine for Ferry.
//!
//! Ferry plugins are container images described by JSON manifests. Each
//! manifest names a plugin, says how to launch it, and declares the actions it
//! offers. The host loads every manifest in a directory into a
//! [`PluginRegistry`], resolves a requested action key to its plugin, and runs
//! the plugin once per request through a [`PluginRunner`].
//!
//! # Architecture
//!
//! A run is a single exchange over standard I/O. The host writes one JSON
//! request line carrying the action key and, optionally, the content of a
//! submitted file. The plugin answers with one JSON object on stdout, which
//! may follow free-text log lines. The process is bounded by a wall-clock
//! timeout and killed when it expires.
//!
//! - [`manifest`] holds the immutable plugin model.
//! - [`parser`] turns loosely-typed manifest documents into that model.
//! - [`registry`] loads and indexes manifests from disk.
//! - [`process`] launches plugins through a container runtime.
//! - [`extract`] recovers the response object from noisy stdout.
//! - [`runner`] ties resolution, execution and decoding together.
//! - [`output`] applies an action's declared output rule to the host
//!   filesystem.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! use ferry_plugins::output::apply_output;
//! use ferry_plugins::process::DockerStdioExecutor;
//! use ferry_plugins::{PluginRegistry, PluginRunner};
//!
//! let registry = PluginRegistry::load("mcps");
//! let runner = PluginRunner::new(registry, DockerStdioExecutor::new());
//! let draft = Path::new("notes.md");
//! let result = runner
//!     .run("refine", Some(draft), Duration::from_secs(60))
//!     .expect("action is configured");
//! if let Some((_, action)) = runner.registry().find_action("refine") {
//!     apply_output(action, &result, Some(draft)).expect("output written");
//! }
//! ```

pub mod error;
pub mod extract;
pub mod manifest;
pub mod output;
pub mod parser;
pub mod process;
pub mod protocol;
pub mod registry;
pub mod runner;

#[cfg(test)]
mod tests;

pub use self::error::PluginError;
pub use self::manifest::{Action, ActionInput, ActionOutput, Plugin, Transport};
pub use self::output::apply_output;
pub use self::process::DockerStdioExecutor;
pub use self::protocol::{FilePayload, RunRequest, RunResult};
pub use self::registry::PluginRegistry;
pub use self::runner::{PluginExecutor, PluginRunner, ProcessOutput};
