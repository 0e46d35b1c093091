//! Unit tests for plugin manifest types.

use std::collections::BTreeMap;

use rstest::rstest;

use super::*;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[test]
fn default_transport_is_docker_without_image() {
    let transport = Transport::default();
    assert_eq!(transport.kind(), DOCKER_STDIO);
    assert_eq!(transport.image(), "");
    assert!(transport.command().is_empty());
    assert!(transport.env().is_empty());
}

#[test]
fn transport_builders_set_command_and_env() {
    let env = BTreeMap::from([(String::from("MODE"), String::from("strict"))]);
    let transport = Transport::docker("acme/refiner")
        .with_command(vec!["--fast".into()])
        .with_env(env.clone());
    assert_eq!(transport.image(), "acme/refiner");
    assert_eq!(transport.command(), ["--fast"]);
    assert_eq!(transport.env(), &env);
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[test]
fn action_title_defaults_to_key() {
    let action = Action::new("refine");
    assert_eq!(action.title(), "refine");
    assert_eq!(action.description(), "");
    assert!(action.inputs().is_empty());
    assert!(action.output().is_none());
}

#[rstest]
#[case::required(true)]
#[case::optional(false)]
fn action_input_keeps_required_flag(#[case] required: bool) {
    let input = ActionInput::new("file", "text", required);
    assert_eq!(input.name(), "file");
    assert_eq!(input.input_type(), "text");
    assert_eq!(input.is_required(), required);
}

#[test]
fn action_output_exposes_rule() {
    let action =
        Action::new("refine").with_output(ActionOutput::new(MARKDOWN_OUTPUT, OVERWRITE_INPUT));
    let output = action.output().expect("output rule");
    assert_eq!(output.output_type(), "markdown");
    assert_eq!(output.target(), "overwrite-input");
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

fn make_plugin() -> Plugin {
    Plugin::new("writer", Transport::docker("acme/writer")).with_actions(vec![
        Action::new("refine"),
        Action::new("summarise").with_title("Summarise"),
    ])
}

#[test]
fn new_plugin_has_defaults() {
    let plugin = Plugin::new("writer", Transport::default());
    assert_eq!(plugin.id(), "writer");
    assert_eq!(plugin.name(), "writer");
    assert_eq!(plugin.version(), DEFAULT_VERSION);
    assert!(plugin.actions().is_empty());
    assert!(plugin.hooks().is_empty());
}

#[test]
fn plugin_builders_override_identity_fields() {
    let plugin = make_plugin().with_name("Writer").with_version("1.2.0");
    assert_eq!(plugin.id(), "writer");
    assert_eq!(plugin.name(), "Writer");
    assert_eq!(plugin.version(), "1.2.0");
}

#[rstest]
#[case::first("refine", Some("refine"))]
#[case::second("summarise", Some("Summarise"))]
#[case::missing("translate", None)]
fn plugin_action_lookup(#[case] key: &str, #[case] expected_title: Option<&str>) {
    let plugin = make_plugin();
    assert_eq!(plugin.action(key).map(Action::title), expected_title);
}
