//! Unit tests for output application.

use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::manifest::ActionOutput;

struct Workspace {
    _dir: TempDir,
    input: PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("draft.md");
    fs::write(&input, "draft").expect("write draft");
    Workspace { _dir: dir, input }
}

fn markdown_action(target: &str) -> Action {
    Action::new("refine").with_output(ActionOutput::new(MARKDOWN_OUTPUT, target))
}

fn result_with(response: Value) -> RunResult {
    let Value::Object(map) = response else {
        panic!("fixture must be an object");
    };
    RunResult::from_response(String::new(), String::new(), map)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read back")
}

#[rstest]
fn overwrites_input_with_top_level_markdown(workspace: Workspace) {
    let result = result_with(json!({"ok": true, "markdown": "X"}));
    let changed = apply_output(
        &markdown_action(OVERWRITE_INPUT),
        &result,
        Some(&workspace.input),
    )
    .expect("apply");
    assert_eq!(changed.as_deref(), Some(workspace.input.as_path()));
    assert_eq!(read(&workspace.input), "X");
}

#[rstest]
fn overwrites_input_with_nested_markdown(workspace: Workspace) {
    let result = result_with(json!({"ok": true, "outputs": {"markdown": "nested"}}));
    let changed = apply_output(
        &markdown_action(OVERWRITE_INPUT),
        &result,
        Some(&workspace.input),
    )
    .expect("apply");
    assert!(changed.is_some());
    assert_eq!(read(&workspace.input), "nested");
}

#[rstest]
fn top_level_markdown_wins_over_nested(workspace: Workspace) {
    let result = result_with(json!({
        "ok": true,
        "markdown": "top",
        "outputs": {"markdown": "nested"}
    }));
    apply_output(
        &markdown_action(OVERWRITE_INPUT),
        &result,
        Some(&workspace.input),
    )
    .expect("apply");
    assert_eq!(read(&workspace.input), "top");
}

#[rstest]
fn non_string_top_level_falls_back_to_nested(workspace: Workspace) {
    let result = result_with(json!({
        "ok": true,
        "markdown": 7,
        "outputs": {"markdown": "nested"}
    }));
    apply_output(
        &markdown_action(OVERWRITE_INPUT),
        &result,
        Some(&workspace.input),
    )
    .expect("apply");
    assert_eq!(read(&workspace.input), "nested");
}

#[rstest]
#[case::not_ok(json!({"ok": false, "markdown": "X"}))]
#[case::ok_missing(json!({"markdown": "X"}))]
#[case::no_markdown(json!({"ok": true, "text": "X"}))]
#[case::markdown_not_string(json!({"ok": true, "markdown": ["X"]}))]
#[case::outputs_not_object(json!({"ok": true, "outputs": "X"}))]
fn response_shapes_without_effect(workspace: Workspace, #[case] response: Value) {
    let changed = apply_output(
        &markdown_action(OVERWRITE_INPUT),
        &result_with(response),
        Some(&workspace.input),
    )
    .expect("apply");
    assert!(changed.is_none());
    assert_eq!(read(&workspace.input), "draft");
}

#[rstest]
#[case::unknown_target(markdown_action("append-input"))]
#[case::empty_target(markdown_action(""))]
#[case::underscore_spelling(markdown_action("overwrite_input"))]
#[case::text_type(Action::new("refine").with_output(ActionOutput::new("text", OVERWRITE_INPUT)))]
#[case::no_rule(Action::new("refine"))]
fn action_rules_without_effect(workspace: Workspace, #[case] action: Action) {
    let result = result_with(json!({"ok": true, "markdown": "X"}));
    let changed = apply_output(&action, &result, Some(&workspace.input)).expect("apply");
    assert!(changed.is_none());
    assert_eq!(read(&workspace.input), "draft");
}

#[test]
fn missing_input_file_is_a_no_op() {
    let result = result_with(json!({"ok": true, "markdown": "X"}));
    let changed = apply_output(&markdown_action(OVERWRITE_INPUT), &result, None).expect("apply");
    assert!(changed.is_none());
}

#[test]
fn unwritable_target_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let missing_parent = dir.path().join("gone").join("draft.md");
    let result = result_with(json!({"ok": true, "markdown": "X"}));
    let error = apply_output(
        &markdown_action(OVERWRITE_INPUT),
        &result,
        Some(&missing_parent),
    )
    .expect_err("write should fail");
    assert!(matches!(error, PluginError::WriteOutput { .. }));
}
