//! Recovery of a plugin's JSON response from noisy stdout.
//!
//! Plugins often log a few lines before answering. Two output shapes are
//! expected: the answer on a line of its own among logs, and a pretty-printed
//! object with no logs around it. Each shape has one attempt in
//! [`ATTEMPTS`], tried in order until one succeeds. JSON embedded in the
//! middle of a log line is not recognised.

use serde_json::{Map, Value};

type Attempt = fn(&str) -> Option<Map<String, Value>>;

/// Extraction attempts, in priority order.
const ATTEMPTS: [Attempt; 2] = [first_object_line, whole_text_object];

/// Extracts the first JSON object from plugin output.
///
/// # Example
///
/// ```
/// use ferry_plugins::extract::extract_response;
///
/// let response = extract_response("INFO starting\n{\"ok\": true}\n").expect("object");
/// assert_eq!(response.get("ok"), Some(&serde_json::Value::Bool(true)));
/// assert!(extract_response("no json here").is_none());
/// ```
#[must_use]
pub fn extract_response(text: &str) -> Option<Map<String, Value>> {
    ATTEMPTS.iter().find_map(|attempt| attempt(text))
}

fn first_object_line(text: &str) -> Option<Map<String, Value>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find_map(parse_object)
}

fn whole_text_object(text: &str) -> Option<Map<String, Value>> {
    parse_object(text)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
