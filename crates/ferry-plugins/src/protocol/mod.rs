//! Wire types for the host-plugin stdio exchange.
//!
//! The protocol is a single request, single response exchange. The host
//! writes one [`RunRequest`] as a JSON line to the plugin's stdin and closes
//! it. The plugin writes one JSON object to stdout, optionally preceded by
//! free-text log lines, and exits. The host keeps the raw streams alongside
//! the decoded response in a [`RunResult`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PluginError;

/// Message placed in the synthetic response when stdout holds no JSON object.
pub const NO_RESPONSE_MESSAGE: &str = "No valid JSON response from MCP.";

/// Request written to a plugin's stdin.
///
/// # Example
///
/// ```
/// use ferry_plugins::protocol::RunRequest;
///
/// let request = RunRequest::new("refine");
/// let line = serde_json::to_string(&request).expect("serialise");
/// assert_eq!(line, r#"{"action":"refine","inputs":{}}"#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRequest {
    action: String,
    inputs: RequestInputs,
}

/// Named inputs carried by a [`RunRequest`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<FilePayload>,
}

impl RunRequest {
    /// Creates a request for `action` with no inputs.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            inputs: RequestInputs::default(),
        }
    }

    /// Attaches the submitted file.
    #[must_use]
    pub fn with_file(mut self, file: FilePayload) -> Self {
        self.inputs.file = Some(file);
        self
    }

    /// Returns the action key.
    #[must_use]
    pub const fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns the submitted file, if any.
    #[must_use]
    pub const fn file(&self) -> Option<&FilePayload> {
        self.inputs.file.as_ref()
    }

    /// Serialises the request as a single newline-terminated JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::SerializeRequest`] if the request cannot be
    /// encoded, for example when a path is not valid UTF-8.
    pub fn to_line(&self) -> Result<String, PluginError> {
        let mut line = serde_json::to_string(self).map_err(PluginError::SerializeRequest)?;
        line.push('\n');
        Ok(line)
    }
}

/// File content sent to the plugin so it needs no filesystem access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilePayload {
    path: PathBuf,
    name: String,
    content: String,
}

impl FilePayload {
    /// Creates a payload from already-loaded content.
    #[must_use]
    pub fn new(path: PathBuf, content: impl Into<String>) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            content: content.into(),
        }
    }

    /// Reads the whole file at `path` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ReadInput`] when the file cannot be read.
    pub fn read(path: &Path) -> Result<Self, PluginError> {
        let content = fs::read_to_string(path).map_err(|source| PluginError::ReadInput {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        Ok(Self::new(path.to_path_buf(), content))
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the final path component.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the file content.
    #[must_use]
    pub const fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// Outcome of one plugin invocation.
///
/// `ok` mirrors the boolean `ok` field of the decoded response and is `false`
/// when that field is missing or not a boolean.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunResult {
    ok: bool,
    stdout: String,
    stderr: String,
    response: Map<String, Value>,
}

impl RunResult {
    /// Builds a result around a decoded response object.
    #[must_use]
    pub fn from_response(stdout: String, stderr: String, response: Map<String, Value>) -> Self {
        let ok = response.get("ok").and_then(Value::as_bool).unwrap_or(false);
        Self {
            ok,
            stdout,
            stderr,
            response,
        }
    }

    /// Builds a failed result whose response carries `message` as `error`.
    #[must_use]
    pub fn failure(stdout: String, stderr: String, message: impl Into<String>) -> Self {
        let mut response = Map::new();
        response.insert(String::from("ok"), Value::Bool(false));
        response.insert(String::from("error"), Value::String(message.into()));
        Self::from_response(stdout, stderr, response)
    }

    /// Returns whether the plugin reported success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.ok
    }

    /// Returns everything the plugin wrote to stdout.
    #[must_use]
    pub const fn stdout(&self) -> &str {
        self.stdout.as_str()
    }

    /// Returns everything the plugin wrote to stderr, plus host markers.
    #[must_use]
    pub const fn stderr(&self) -> &str {
        self.stderr.as_str()
    }

    /// Returns the decoded (or synthesised) response object.
    #[must_use]
    pub const fn response(&self) -> &Map<String, Value> {
        &self.response
    }

    /// Returns the response's `error` text, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.response.get("error").and_then(Value::as_str)
    }
}
