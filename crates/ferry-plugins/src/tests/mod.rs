//! Crate-level integration and BDD tests.

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use crate::error::PluginError;
use crate::manifest::Plugin;
use crate::runner::{PluginExecutor, ProcessOutput};


/// Executor that replays a fixed process output for every invocation.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedExecutor {
    output: ProcessOutput,
}

impl ScriptedExecutor {
    pub(crate) const fn new(output: ProcessOutput) -> Self {
        Self { output }
    }
}

impl PluginExecutor for ScriptedExecutor {
    fn execute(
        &self,
        _plugin: &Plugin,
        _request_line: &str,
        _timeout: Duration,
    ) -> Result<ProcessOutput, PluginError> {
        Ok(self.output.clone())
    }
}

/// Writes an executable `#!/bin/sh` script into `dir`.
#[cfg(unix)]
pub(crate) fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    let mut permissions = fs::metadata(&path).expect("script metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("chmod script");
    path
}

/// Loads a manifest from disk, runs it through a shell script standing in for
/// the container runtime, and applies the markdown rule to the input file.
#[cfg(unix)]
#[test]
fn refine_round_trip_through_runtime_script() {
    use std::fs;

    use crate::output::apply_output;
    use crate::process::DockerStdioExecutor;
    use crate::registry::PluginRegistry;
    use crate::runner::PluginRunner;

    let plugins = TempDir::new().expect("plugin dir");
    fs::write(
        plugins.path().join("writer.json"),
        r#"{
            "id": "writer",
            "name": "Writer",
            "version": "1.2.0",
            "transport": {"kind": "docker-stdio", "image": "acme/writer:1"},
            "actions": [{
                "key": "refine",
                "title": "Refine draft",
                "inputs": [{"name": "file", "type": "file", "required": true}],
                "output": {"type": "markdown", "target": "overwrite-input"}
            }]
        }"#,
    )
    .expect("write manifest");

    let work = TempDir::new().expect("work dir");
    let draft = work.path().join("draft.md");
    fs::write(&draft, "draft").expect("write draft");
    let runtime = write_script(
        &work,
        "runtime.sh",
        concat!(
            "read -r request\n",
            "case \"$request\" in\n",
            "  *'\"content\":\"draft\"'*) ;;\n",
            "  *) echo '{\"ok\":false,\"error\":\"unexpected request\"}'; exit 0 ;;\n",
            "esac\n",
            "echo 'INFO refining' >&2\n",
            "echo 'loading model'\n",
            "printf '%s\\n' '{\"ok\":true,\"markdown\":\"draft\\n\\n<!-- refined -->\\n\"}'\n",
        ),
    );

    let registry = PluginRegistry::load(plugins.path());
    let runner = PluginRunner::new(registry, DockerStdioExecutor::new().with_runtime(runtime));
    let (_, action) = runner.registry().find_action("refine").expect("action");
    let action = action.clone();

    let result = runner
        .run("refine", Some(&draft), Duration::from_secs(10))
        .expect("run");
    assert!(result.is_ok(), "plugin failed: {:?}", result.response());
    assert_eq!(result.stderr(), "INFO refining\n");

    let changed = apply_output(&action, &result, Some(&draft)).expect("apply");
    assert_eq!(changed, Some(draft.clone()));
    assert_eq!(
        fs::read_to_string(&draft).expect("read draft"),
        "draft\n\n<!-- refined -->\n"
    );
}
