//! Process-based plugin execution through a container runtime.
//!
//! [`DockerStdioExecutor`] implements the [`PluginExecutor`] trait by running
//! `<runtime> run --rm -i [-e KEY=VALUE]... <image> [command]...`, writing the
//! request line to the child's stdin and closing it, and collecting stdout and
//! stderr until the child exits or the timeout expires. Isolation is left to
//! the container runtime.
//!
//! Both output pipes are drained by reader threads into shared buffers, and
//! the request is written from its own thread, so a child that never reads its
//! input or floods its output cannot stall the host past the deadline. When
//! the deadline passes the child is killed and reaped, the readers get a short
//! grace period to reach end-of-file, and whatever bytes were buffered by then
//! are returned. A descendant that keeps a pipe open therefore costs at most
//! the grace period.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::PluginError;
use crate::manifest::{Plugin, Transport};
use crate::runner::{PluginExecutor, ProcessOutput};

/// Tracing target for plugin process operations.
const PROCESS_TARGET: &str = "ferry_plugins::process";

/// Container runtime used when none is configured.
pub const DEFAULT_RUNTIME: &str = "docker";

/// Marker appended to the stderr record of a plugin killed at its deadline.
pub const TIMEOUT_MARKER: &str = "[timeout]";

/// Time allowed for output readers to finish once the child has exited.
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Interval between exit checks while waiting for the child.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Size of the chunks copied out of the output pipes.
const READ_CHUNK: usize = 8 * 1024;

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Executes plugins as `docker-stdio` containers.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use ferry_plugins::process::DockerStdioExecutor;
/// use ferry_plugins::runner::PluginExecutor;
/// use ferry_plugins::{Plugin, Transport};
///
/// let executor = DockerStdioExecutor::new().with_runtime("podman");
/// let plugin = Plugin::new("writer", Transport::docker("acme/writer"));
/// let output = executor
///     .execute(&plugin, "{\"action\":\"refine\",\"inputs\":{}}\n", Duration::from_secs(30))
///     .expect("spawn");
/// println!("{}", output.stdout());
/// ```
#[derive(Debug, Clone)]
pub struct DockerStdioExecutor {
    runtime: OsString,
    grace_period: Duration,
}

impl Default for DockerStdioExecutor {
    fn default() -> Self {
        Self {
            runtime: OsString::from(DEFAULT_RUNTIME),
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

impl DockerStdioExecutor {
    /// Creates an executor that launches containers with `docker`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses another runtime binary with a docker-compatible `run` command.
    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<OsString>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Overrides how long output readers may run on after the child exits.
    #[must_use]
    pub const fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Builds the runtime invocation for a transport.
    #[must_use]
    pub fn command(&self, transport: &Transport) -> Command {
        let mut command = Command::new(&self.runtime);
        command.args(["run", "--rm", "-i"]);
        for (key, value) in transport.env() {
            command.arg("-e").arg(format!("{key}={value}"));
        }
        command.arg(transport.image());
        command.args(transport.command());
        command
    }
}

impl PluginExecutor for DockerStdioExecutor {
    fn execute(
        &self,
        plugin: &Plugin,
        request_line: &str,
        timeout: Duration,
    ) -> Result<ProcessOutput, PluginError> {
        let mut command = self.command(plugin.transport());
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        run_child(plugin.id(), command, request_line, timeout, self.grace_period)
    }
}

/// Spawns `command`, feeds it `request_line`, and collects its output.
pub(crate) fn run_child(
    name: &str,
    mut command: Command,
    request_line: &str,
    timeout: Duration,
    grace_period: Duration,
) -> Result<ProcessOutput, PluginError> {
    debug!(
        target: PROCESS_TARGET,
        plugin = name,
        program = %command.get_program().to_string_lossy(),
        "spawning plugin process"
    );

    let mut child = command.spawn().map_err(|err| PluginError::SpawnFailed {
        plugin: name.to_owned(),
        message: err.to_string(),
        source: Some(Arc::new(err)),
    })?;

    let streams = match PipeSet::attach(name, &mut child, request_line) {
        Ok(streams) => streams,
        Err(error) => {
            reap(name, &mut child);
            return Err(error);
        }
    };

    let timed_out = match wait_for_exit(name, &mut child, timeout) {
        Ok(timed_out) => timed_out,
        Err(error) => {
            reap(name, &mut child);
            return Err(error);
        }
    };

    let (stdout, mut stderr) = streams.harvest(name, grace_period);
    if timed_out {
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(TIMEOUT_MARKER);
        return Ok(ProcessOutput::timed_out(stdout, stderr));
    }
    Ok(ProcessOutput::completed(stdout, stderr))
}

/// Reader and writer threads bound to one child's pipes.
struct PipeSet {
    stdout: SharedBuffer,
    stderr: SharedBuffer,
    finished: Receiver<()>,
    readers: Vec<JoinHandle<()>>,
    writer: JoinHandle<io::Result<()>>,
}

impl PipeSet {
    fn attach(name: &str, child: &mut Child, request_line: &str) -> Result<Self, PluginError> {
        let stdin = take_pipe(name, child.stdin.take(), "stdin")?;
        let stdout_pipe = take_pipe(name, child.stdout.take(), "stdout")?;
        let stderr_pipe = take_pipe(name, child.stderr.take(), "stderr")?;

        let (done, finished) = mpsc::channel();
        let stdout = SharedBuffer::default();
        let stderr = SharedBuffer::default();
        let readers = vec![
            spawn_reader(name, "stdout", stdout_pipe, Arc::clone(&stdout), done.clone())?,
            spawn_reader(name, "stderr", stderr_pipe, Arc::clone(&stderr), done)?,
        ];
        let writer = spawn_writer(name, stdin, request_line.to_owned())?;

        Ok(Self {
            stdout,
            stderr,
            finished,
            readers,
            writer,
        })
    }

    /// Waits up to `grace_period` for both readers, then takes whatever the
    /// buffers hold.
    fn harvest(self, name: &str, grace_period: Duration) -> (String, String) {
        let deadline = Instant::now() + grace_period;
        let mut pending = self.readers.len();
        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.finished.recv_timeout(remaining) {
                Ok(()) => pending -= 1,
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        target: PROCESS_TARGET,
                        plugin = name,
                        pending,
                        "output pipes still open after grace period, keeping partial output"
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if pending == 0 {
            for reader in self.readers {
                drop(reader.join());
            }
        }
        finish_writer(name, self.writer);

        (drain(&self.stdout), drain(&self.stderr))
    }
}

fn take_pipe<T>(name: &str, pipe: Option<T>, stream: &str) -> Result<T, PluginError> {
    pipe.ok_or_else(|| PluginError::SpawnFailed {
        plugin: name.to_owned(),
        message: format!("failed to capture {stream}"),
        source: None,
    })
}

fn spawn_reader(
    name: &str,
    stream: &str,
    mut pipe: impl Read + Send + 'static,
    buffer: SharedBuffer,
    done: Sender<()>,
) -> Result<JoinHandle<()>, PluginError> {
    thread::Builder::new()
        .name(format!("ferry-{stream}"))
        .spawn(move || {
            let mut chunk = [0_u8; READ_CHUNK];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(read) => buffer
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(chunk.get(..read).unwrap_or_default()),
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                    Err(_) => break,
                }
            }
            drop(done.send(()));
        })
        .map_err(|source| PluginError::Io {
            plugin: name.to_owned(),
            source: Arc::new(source),
        })
}

/// Writes the request and drops stdin so the plugin sees end-of-input.
fn spawn_writer(
    name: &str,
    mut stdin: ChildStdin,
    request_line: String,
) -> Result<JoinHandle<io::Result<()>>, PluginError> {
    thread::Builder::new()
        .name(String::from("ferry-stdin"))
        .spawn(move || {
            stdin.write_all(request_line.as_bytes())?;
            stdin.flush()
        })
        .map_err(|source| PluginError::Io {
            plugin: name.to_owned(),
            source: Arc::new(source),
        })
}

fn finish_writer(name: &str, writer: JoinHandle<io::Result<()>>) {
    if !writer.is_finished() {
        debug!(
            target: PROCESS_TARGET,
            plugin = name,
            "request writer still blocked, abandoning it"
        );
        return;
    }
    match writer.join() {
        Ok(Ok(())) => {}
        Ok(Err(error)) if error.kind() == io::ErrorKind::BrokenPipe => {
            debug!(
                target: PROCESS_TARGET,
                plugin = name,
                "plugin closed stdin before reading the whole request"
            );
        }
        Ok(Err(error)) => {
            warn!(
                target: PROCESS_TARGET,
                plugin = name,
                %error,
                "failed to write request to plugin stdin"
            );
        }
        Err(_) => {
            warn!(target: PROCESS_TARGET, plugin = name, "request writer panicked");
        }
    }
}

fn drain(buffer: &SharedBuffer) -> String {
    let bytes = std::mem::take(&mut *buffer.lock().unwrap_or_else(PoisonError::into_inner));
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Waits for the child to exit, killing it once `timeout` has elapsed.
///
/// Returns `true` when the child was killed at the deadline.
fn wait_for_exit(name: &str, child: &mut Child, timeout: Duration) -> Result<bool, PluginError> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    target: PROCESS_TARGET,
                    plugin = name,
                    ?status,
                    elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "plugin process exited"
                );
                return Ok(false);
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    warn!(
                        target: PROCESS_TARGET,
                        plugin = name,
                        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        "plugin timed out, killing process"
                    );
                    reap(name, child);
                    return Ok(true);
                }
                thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(start.elapsed())));
            }
            Err(err) => {
                return Err(PluginError::Io {
                    plugin: name.to_owned(),
                    source: Arc::new(err),
                });
            }
        }
    }
}

/// Kills the child if still running and collects its exit status.
fn reap(name: &str, child: &mut Child) {
    if let Err(error) = child.kill() {
        debug!(target: PROCESS_TARGET, plugin = name, %error, "kill failed");
    }
    if let Err(error) = child.wait() {
        debug!(target: PROCESS_TARGET, plugin = name, %error, "wait failed");
    }
}
