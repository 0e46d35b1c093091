//! Best-effort conversion of untyped manifest documents into [`Plugin`]s.
//!
//! Manifests are hand-written JSON, so the parser never rejects a document
//! for a single bad entry. Missing fields take defaults, fields of the wrong
//! shape are coerced or emptied, and malformed actions or inputs are dropped.
//! The only fatal condition is a missing or blank identity, in which case
//! [`parse_plugin`] returns `None`.
//!
//! English keys are canonical. The Portuguese keys used by the first
//! generation of manifests are accepted as aliases; when both spellings are
//! present the canonical key wins.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::debug;

use crate::manifest::{
    Action, ActionInput, ActionOutput, DEFAULT_VERSION, DOCKER_STDIO, Plugin, Transport,
};

/// Tracing target for manifest parsing.
const PARSER_TARGET: &str = "ferry_plugins::parser";

/// Input type assumed when an input omits one.
const DEFAULT_INPUT_TYPE: &str = "text";

/// Output type assumed when an output rule omits one.
const DEFAULT_OUTPUT_TYPE: &str = "text";

const ID: &[&str] = &["id"];
const NAME: &[&str] = &["name", "nome"];
const VERSION: &[&str] = &["version", "versao"];
const TRANSPORT: &[&str] = &["transport", "transporte"];
const KIND: &[&str] = &["kind", "tipo"];
const IMAGE: &[&str] = &["image", "imagem"];
const COMMAND: &[&str] = &["command", "comando"];
const ENV: &[&str] = &["env"];
const ACTIONS: &[&str] = &["actions", "acoes"];
const KEY: &[&str] = &["key", "chave"];
const TITLE: &[&str] = &["title", "titulo"];
const DESCRIPTION: &[&str] = &["description", "descricao"];
const INPUTS: &[&str] = &["inputs", "entradas"];
const INPUT_TYPE: &[&str] = &["type", "tipo"];
const REQUIRED: &[&str] = &["required", "obrigatorio"];
const OUTPUT: &[&str] = &["output", "saida"];
const OUTPUT_TYPE: &[&str] = &["type", "tipo"];
const TARGET: &[&str] = &["target", "destino"];
const HOOKS: &[&str] = &["hooks", "ganchos"];

/// Parses a manifest document into a plugin.
///
/// Returns `None` when the document is not an object or lacks a non-blank
/// string `id`. Every other defect degrades to a default or an omission.
///
/// # Example
///
/// ```
/// use ferry_plugins::parser::parse_plugin;
/// use serde_json::json;
///
/// let plugin = parse_plugin(&json!({
///     "id": "writer",
///     "transport": {"image": "acme/writer"},
///     "actions": [{"key": "refine"}, {"key": "  "}, 42],
/// }))
/// .expect("plugin");
/// assert_eq!(plugin.version(), "0.0.0");
/// assert_eq!(plugin.actions().len(), 1);
///
/// assert!(parse_plugin(&json!({"name": "anonymous"})).is_none());
/// ```
#[must_use]
pub fn parse_plugin(document: &Value) -> Option<Plugin> {
    let Some(map) = document.as_object() else {
        debug!(target: PARSER_TARGET, "manifest root is not an object");
        return None;
    };

    let id = match field(map, ID).and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            debug!(target: PARSER_TARGET, "manifest has no usable id");
            return None;
        }
    };

    let name = string_or(map, NAME, id);
    let version = string_or(map, VERSION, DEFAULT_VERSION);
    let transport = parse_transport(field(map, TRANSPORT));
    let actions = field(map, ACTIONS)
        .and_then(Value::as_array)
        .map(|entries| parse_actions(id, entries))
        .unwrap_or_default();
    let hooks = string_map(field(map, HOOKS));

    Some(
        Plugin::new(id, transport)
            .with_name(name)
            .with_version(version)
            .with_actions(actions)
            .with_hooks(hooks),
    )
}

fn parse_transport(value: Option<&Value>) -> Transport {
    let Some(map) = value.and_then(Value::as_object) else {
        return Transport::default();
    };

    let kind = string_or(map, KIND, DOCKER_STDIO);
    let image = string_or(map, IMAGE, "").trim().to_owned();
    let command = field(map, COMMAND)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(coerce_string).collect())
        .unwrap_or_default();

    Transport::new(kind, image)
        .with_command(command)
        .with_env(string_map(field(map, ENV)))
}

fn parse_actions(plugin_id: &str, entries: &[Value]) -> Vec<Action> {
    let parsed: Vec<Action> = entries.iter().filter_map(parse_action).collect();
    let malformed = entries.len() - parsed.len();
    if malformed > 0 {
        debug!(
            target: PARSER_TARGET,
            plugin = plugin_id,
            dropped = malformed,
            "dropped malformed action entries"
        );
    }

    let mut seen = BTreeSet::new();
    let mut actions = Vec::with_capacity(parsed.len());
    for action in parsed {
        if seen.insert(action.key().to_owned()) {
            actions.push(action);
        } else {
            debug!(
                target: PARSER_TARGET,
                plugin = plugin_id,
                key = action.key(),
                "dropped action with duplicate key"
            );
        }
    }
    actions
}

fn parse_action(entry: &Value) -> Option<Action> {
    let map = entry.as_object()?;
    let key = string_or(map, KEY, "").trim().to_owned();
    if key.is_empty() {
        return None;
    }

    let title = string_or(map, TITLE, &key);
    let description = string_or(map, DESCRIPTION, "");
    let inputs = field(map, INPUTS)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_input).collect())
        .unwrap_or_default();

    let action = Action::new(key)
        .with_title(title)
        .with_description(description)
        .with_inputs(inputs);

    Some(match field(map, OUTPUT).and_then(Value::as_object) {
        Some(output) => action.with_output(ActionOutput::new(
            string_or(output, OUTPUT_TYPE, DEFAULT_OUTPUT_TYPE),
            string_or(output, TARGET, ""),
        )),
        None => action,
    })
}

fn parse_input(entry: &Value) -> Option<ActionInput> {
    let map = entry.as_object()?;
    let name = string_or(map, NAME, "").trim().to_owned();
    if name.is_empty() {
        return None;
    }
    let input_type = string_or(map, INPUT_TYPE, DEFAULT_INPUT_TYPE).trim().to_owned();
    let required = field(map, REQUIRED).is_some_and(truthy);
    Some(ActionInput::new(name, input_type, required))
}

/// Returns the first non-null value stored under any of `keys`.
fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| map.get(*key).filter(|value| !value.is_null()))
}

fn string_or(map: &Map<String, Value>, keys: &[&str], default: &str) -> String {
    field(map, keys).map_or_else(|| default.to_owned(), coerce_string)
}

/// Coerces an object of arbitrary values into string pairs. Anything that is
/// not an object yields an empty mapping.
fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(key, item)| (key.clone(), coerce_string(item)))
                .collect()
        })
        .unwrap_or_default()
}

/// Renders a scalar as text; strings are taken verbatim, everything else uses
/// its compact JSON form.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}
