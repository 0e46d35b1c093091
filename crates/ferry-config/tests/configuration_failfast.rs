//! Loading fails loudly on malformed input instead of falling back to
//! defaults.

use std::ffi::OsString;
use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use ferry_config::{Config, LogFormat, OrthoConfig as _};

fn load_with_file(contents: &str) -> Result<Config, String> {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("ferry.toml");
    fs::write(&path, contents).expect("write config");
    let args = vec![
        OsString::from("ferry"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];
    Config::load_from_iter(args).map_err(|error| error.to_string())
}

#[rstest]
#[case::broken_syntax("mcp_enabled = ")]
#[case::wrong_type("timeout_secs = \"soon\"")]
#[case::unknown_format("log_format = \"xml\"")]
fn malformed_file_is_rejected(#[case] contents: &str) {
    let result = load_with_file(contents);
    assert!(result.is_err(), "expected failure, got {result:?}");
}

#[test]
fn valid_file_is_applied() {
    let config = load_with_file("container_runtime = \"podman\"\nlog_format = \"json\"\n")
        .expect("config loads");
    assert_eq!(config.container_runtime(), "podman");
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[rstest]
#[case::json("json", LogFormat::Json)]
#[case::compact("compact", LogFormat::Compact)]
#[case::mixed_case("JSON", LogFormat::Json)]
fn log_format_parses_case_insensitively(#[case] text: &str, #[case] expected: LogFormat) {
    assert_eq!(text.parse::<LogFormat>().expect("parse"), expected);
}

#[test]
fn log_format_displays_in_snake_case() {
    assert_eq!(LogFormat::Compact.to_string(), "compact");
    assert!("yaml".parse::<LogFormat>().is_err());
}

#[rstest]
#[case::enabled("mcp_enabled = true\ntimeout_secs = 7\n", true)]
#[case::disabled("mcp_enabled = false\ntimeout_secs = 7\n", false)]
fn file_controls_execution_opt_in(#[case] contents: &str, #[case] expected: bool) {
    let config = load_with_file(contents).expect("config loads");
    assert_eq!(config.mcp_enabled(), expected);
    assert_eq!(config.timeout_secs, 7);
}
