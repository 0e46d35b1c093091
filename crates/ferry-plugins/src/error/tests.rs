//! Unit tests for plugin error types.

use std::path::PathBuf;
use std::sync::Arc;

use rstest::rstest;

use super::*;

#[test]
fn action_not_found_message_includes_key() {
    let error = PluginError::ActionNotFound {
        key: "refine".into(),
    };
    let message = error.to_string();
    assert!(
        message.contains("refine"),
        "expected key in message: {message}"
    );
    assert!(
        message.contains("not found"),
        "expected 'not found' in message: {message}"
    );
}

#[test]
fn unsupported_transport_names_plugin_and_kind() {
    let error = PluginError::UnsupportedTransport {
        plugin: "writer".into(),
        kind: "http".into(),
    };
    let message = error.to_string();
    assert!(message.contains("writer"), "missing plugin: {message}");
    assert!(message.contains("http"), "missing kind: {message}");
}

#[test]
fn read_input_includes_path() {
    let error = PluginError::ReadInput {
        path: PathBuf::from("/work/notes.md"),
        source: Arc::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
    };
    let message = error.to_string();
    assert!(
        message.contains("/work/notes.md"),
        "expected path in message: {message}"
    );
}

#[test]
fn errors_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PluginError>();
}

#[rstest]
#[case::not_found(PluginError::ActionNotFound { key: "x".into() }, true)]
#[case::transport(
    PluginError::UnsupportedTransport { plugin: "p".into(), kind: "ssh".into() },
    true
)]
#[case::image(PluginError::MissingImage { plugin: "p".into() }, true)]
#[case::read_input(
    PluginError::ReadInput {
        path: PathBuf::from("in.md"),
        source: Arc::new(std::io::Error::other("denied")),
    },
    true
)]
#[case::spawn(
    PluginError::SpawnFailed { plugin: "p".into(), message: "no docker".into(), source: None },
    false
)]
#[case::write_output(
    PluginError::WriteOutput {
        path: PathBuf::from("out.md"),
        source: Arc::new(std::io::Error::other("read-only")),
    },
    false
)]
fn configuration_errors_are_classified(#[case] error: PluginError, #[case] expected: bool) {
    assert_eq!(error.is_configuration_error(), expected, "{error}");
}
