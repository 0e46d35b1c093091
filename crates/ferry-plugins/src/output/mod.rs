//! Application of an action's declared output rule.
//!
//! The only effect a plugin response may have on the host is the one its
//! action declares. Today that is a single rule: a `markdown` output aimed at
//! `overwrite-input` replaces the submitted file with the returned document.
//! Any other combination, or a response without markdown, leaves the
//! filesystem untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::PluginError;
use crate::manifest::{Action, MARKDOWN_OUTPUT, OVERWRITE_INPUT};
use crate::protocol::RunResult;

/// Tracing target for output application.
const OUTPUT_TARGET: &str = "ferry_plugins::output";

/// Applies `action`'s output rule to `result`.
///
/// Returns the path that was rewritten, or `None` when the rule does not call
/// for a write: the run failed, the action declares no markdown output, the
/// response carries no markdown, the target is not `overwrite-input`, or no
/// input file was submitted.
///
/// # Errors
///
/// Returns [`PluginError::WriteOutput`] when the rule applies but the file
/// cannot be written.
///
/// # Example
///
/// ```
/// use ferry_plugins::output::apply_output;
/// use ferry_plugins::protocol::RunResult;
/// use ferry_plugins::{Action, ActionOutput};
///
/// let action = Action::new("refine").with_output(ActionOutput::new("markdown", "overwrite-input"));
/// let failed = RunResult::failure(String::new(), String::new(), "boom");
/// assert_eq!(apply_output(&action, &failed, None).unwrap(), None);
/// ```
pub fn apply_output(
    action: &Action,
    result: &RunResult,
    input_file: Option<&Path>,
) -> Result<Option<PathBuf>, PluginError> {
    if !result.is_ok() {
        return Ok(None);
    }
    let Some(rule) = action.output() else {
        return Ok(None);
    };
    if rule.output_type() != MARKDOWN_OUTPUT {
        debug!(
            target: OUTPUT_TARGET,
            action = action.key(),
            output_type = rule.output_type(),
            "no handler for output type"
        );
        return Ok(None);
    }
    let Some(markdown) = extract_markdown(result.response()) else {
        debug!(target: OUTPUT_TARGET, action = action.key(), "response has no markdown");
        return Ok(None);
    };
    if rule.target() != OVERWRITE_INPUT {
        debug!(
            target: OUTPUT_TARGET,
            action = action.key(),
            target_name = rule.target(),
            "no handler for output target"
        );
        return Ok(None);
    }
    let Some(path) = input_file else {
        return Ok(None);
    };

    fs::write(path, markdown).map_err(|source| PluginError::WriteOutput {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })?;
    info!(
        target: OUTPUT_TARGET,
        action = action.key(),
        path = %path.display(),
        bytes = markdown.len(),
        "overwrote input file with plugin output"
    );
    Ok(Some(path.to_path_buf()))
}

/// Finds the markdown document in a response: top-level `markdown` first,
/// then `outputs.markdown`.
fn extract_markdown(response: &Map<String, Value>) -> Option<&str> {
    response
        .get("markdown")
        .and_then(Value::as_str)
        .or_else(|| {
            response
                .get("outputs")
                .and_then(|outputs| outputs.get("markdown"))
                .and_then(Value::as_str)
        })
}

#[cfg(test)]
mod tests;
