//! Sandbox backed by a `node` subprocess per call.

use super::Sandbox;
use crate::config::{GraderConfig, Isolation};
use crate::error::ExecutionError;
use crate::types::Submission;
use crate::value::Value;
use crate::wire;
use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

const HARNESS: &str = include_str!("harness.js");
const HARNESS_FILE: &str = "harness.js";
const SUBMISSION_FILE: &str = "submission.js";
const ARGS_FILE: &str = "args.json";
const RUN_FILES: [&str; 3] = [HARNESS_FILE, SUBMISSION_FILE, ARGS_FILE];

/// Mount point of the run directory inside a container.
const CONTAINER_WORKDIR: &str = "/sandbox";
const CONTAINER_PIDS_LIMIT: u32 = 64;
/// Memory a container may use beyond the heap cap.
const CONTAINER_OVERHEAD_MB: u64 = 64;

/// Extra wall-clock time for process start-up on top of the call timeout.
const DEFAULT_GRACE: Duration = Duration::from_millis(500);
const CONTAINER_GRACE: Duration = Duration::from_secs(3);

/// Runs each call in a fresh `node` process.
///
/// Every call gets its own temporary directory, an environment holding only
/// `PATH`, a heap cap, and is killed when the wall-clock limit elapses. The
/// process itself is confined according to [`Isolation`]:
///
/// - `Permission`: node's permission model allows reading the three run
///   files and nothing else, and denies writes, child processes, workers
///   and native addons.
/// - `Container`: node runs in a throwaway container with no network, a
///   read-only root, a memory limit and a process limit.
///
/// In both modes the host realm refuses code generation from strings, so the
/// submission's `vm` context cannot reach `process` through a borrowed
/// constructor, and the result line is only trusted when it carries a nonce
/// the submission never sees.
#[derive(Debug, Clone)]
pub struct NodeSandbox {
    node_binary: String,
    max_memory_mb: u64,
    grace: Duration,
    isolation: Isolation,
    container_runtime: String,
    container_image: String,
    permission_flag: Arc<OnceCell<Result<&'static str, String>>>,
}

impl Default for NodeSandbox {
    fn default() -> Self {
        Self::from_config(&GraderConfig::default())
    }
}

impl NodeSandbox {
    pub fn new(node_binary: impl Into<String>) -> Self {
        Self {
            node_binary: node_binary.into(),
            ..Self::default()
        }
    }

    pub fn from_config(config: &GraderConfig) -> Self {
        let grace = match config.isolation {
            Isolation::Permission => DEFAULT_GRACE,
            Isolation::Container => CONTAINER_GRACE,
        };
        Self {
            node_binary: config.node_binary.clone(),
            max_memory_mb: config.max_memory_mb,
            grace,
            isolation: config.isolation,
            container_runtime: config.container_runtime.clone(),
            container_image: config.container_image.clone(),
            permission_flag: Arc::default(),
        }
    }

    pub fn with_max_memory_mb(mut self, max_memory_mb: u64) -> Self {
        self.max_memory_mb = max_memory_mb;
        self
    }

    /// Time allowed for process start-up beyond the call timeout.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Run calls with `node` from `image` under the container runtime.
    pub fn with_container(mut self, image: impl Into<String>) -> Self {
        self.isolation = Isolation::Container;
        self.container_image = image.into();
        self.grace = self.grace.max(CONTAINER_GRACE);
        self
    }

    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Check that the configured runtime starts and can confine a call.
    pub async fn is_available(&self) -> bool {
        match self.isolation {
            Isolation::Permission => self.permission_flag().await.is_ok(),
            Isolation::Container => Command::new(&self.container_runtime)
                .args(["image", "inspect", &self.container_image])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map(|s| s.success())
                .unwrap_or(false),
        }
    }

    /// The permission-model flag the local `node` understands, detected once.
    async fn permission_flag(&self) -> Result<&'static str, ExecutionError> {
        self.permission_flag
            .get_or_init(|| detect_permission_flag(self.node_binary.clone()))
            .await
            .clone()
            .map_err(ExecutionError::Unavailable)
    }

    fn local_command(&self, permission: &str, dir: &Path, entry: &str, limit: Duration) -> Command {
        let mut cmd = Command::new(&self.node_binary);
        cmd.arg(permission);
        for file in RUN_FILES {
            cmd.arg(format!("--allow-fs-read={}", dir.join(file).display()));
        }
        cmd.arg("--no-warnings")
            .args(self.node_flags(entry, limit))
            .current_dir(dir)
            .env_clear();
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path);
        }
        cmd
    }

    fn container_command(&self, name: &str, dir: &Path, entry: &str, limit: Duration) -> Command {
        let memory_mb = self.max_memory_mb + CONTAINER_OVERHEAD_MB;
        let mut cmd = Command::new(&self.container_runtime);
        cmd.args(["run", "--rm", "--interactive", "--name", name])
            .arg("--network=none")
            .arg(format!("--memory={}m", memory_mb))
            .arg(format!("--memory-swap={}m", memory_mb))
            .arg(format!("--pids-limit={}", CONTAINER_PIDS_LIMIT))
            .arg("--cpus=1")
            .arg("--read-only")
            .arg("--cap-drop=ALL")
            .arg("--security-opt=no-new-privileges")
            .arg("--user=65534:65534")
            .arg("-v")
            .arg(format!("{}:{}:ro", dir.display(), CONTAINER_WORKDIR))
            .arg("-w")
            .arg(CONTAINER_WORKDIR)
            .arg(&self.container_image)
            .arg("node")
            .args(self.node_flags(entry, limit))
            .env_clear();
        for var in ["PATH", "HOME", "DOCKER_HOST", "DOCKER_CONFIG"] {
            if let Some(value) = std::env::var_os(var) {
                cmd.env(var, value);
            }
        }
        cmd
    }

    fn node_flags(&self, entry: &str, limit: Duration) -> Vec<String> {
        vec![
            "--disallow-code-generation-from-strings".to_string(),
            format!("--max-old-space-size={}", self.max_memory_mb),
            HARNESS_FILE.to_string(),
            entry.to_string(),
            limit.as_millis().to_string(),
        ]
    }

    async fn remove_container(&self, name: &str) {
        let removed = Command::new(&self.container_runtime)
            .args(["rm", "--force", name])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        if let Err(e) = removed {
            warn!(container = name, error = %e, "failed to remove container");
        }
    }
}

#[async_trait]
impl Sandbox for NodeSandbox {
    async fn run(
        &self,
        submission: &Submission,
        args: &[Value],
        limit: Duration,
    ) -> Result<Value, ExecutionError> {
        let entry = submission.resolve_entry_point(args.len()).ok_or_else(|| {
            ExecutionError::Compile("no entry function found in submission".to_string())
        })?;

        let dir = tempdir().map_err(io_unavailable)?;
        let shared = self.isolation == Isolation::Container;
        let root = prepare_run_dir(dir.path(), &submission.source, args, shared)?;

        let nonce = Uuid::new_v4().simple().to_string();
        let container = format!("grade-{}", nonce);
        let mut cmd = match self.isolation {
            Isolation::Permission => {
                let flag = self.permission_flag().await?;
                self.local_command(flag, &root, &entry, limit)
            }
            Isolation::Container => self.container_command(&container, &root, &entry, limit),
        };
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            let program = match self.isolation {
                Isolation::Permission => &self.node_binary,
                Isolation::Container => &self.container_runtime,
            };
            ExecutionError::Unavailable(format!("failed to start {}: {}", program, e))
        })?;

        debug!(entry = %entry, args = args.len(), isolation = ?self.isolation, "spawned node");

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(format!("{}\n", nonce).as_bytes()).await {
                debug!(error = %e, "node closed stdin before reading the nonce");
            }
        }

        // Dropping the child on timeout kills it.
        let output = match timeout(limit + self.grace, child.wait_with_output()).await {
            Ok(output) => output.map_err(io_unavailable)?,
            Err(_) => {
                warn!(entry = %entry, limit_ms = limit.as_millis() as u64, "killed node after wall-clock limit");
                if self.isolation == Isolation::Container {
                    self.remove_container(&container).await;
                }
                return Err(ExecutionError::Timeout(limit));
            }
        };

        interpret_output(&output, &nonce, limit)
    }
}

/// Write the run files and return the directory's canonical path, which is
/// what the permission model compares against. A `shared` directory is made
/// readable by the container's unprivileged user.
fn prepare_run_dir(
    dir: &Path,
    source: &str,
    args: &[Value],
    shared: bool,
) -> Result<PathBuf, ExecutionError> {
    fs::write(dir.join(HARNESS_FILE), HARNESS).map_err(io_unavailable)?;
    fs::write(dir.join(SUBMISSION_FILE), source).map_err(io_unavailable)?;
    fs::write(dir.join(ARGS_FILE), wire::encode_args(args)).map_err(io_unavailable)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if shared {
            fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).map_err(io_unavailable)?;
        }
    }
    #[cfg(not(unix))]
    let _ = shared;

    fs::canonicalize(dir).map_err(io_unavailable)
}

async fn detect_permission_flag(node_binary: String) -> Result<&'static str, String> {
    let output = Command::new(&node_binary)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| format!("failed to start {}: {}", node_binary, e))?;
    let version = String::from_utf8_lossy(&output.stdout);
    let version = version.trim();
    permission_flag_for(version).ok_or_else(|| {
        format!(
            "{} {} has no usable permission model (node 20.7 or later is required)",
            node_binary, version
        )
    })
}

/// Map `node --version` output to its permission-model flag.
fn permission_flag_for(version: &str) -> Option<&'static str> {
    let mut parts = version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .map(|p| p.parse::<u32>().ok());
    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    match (major, minor) {
        (m, _) if m >= 24 => Some("--permission"),
        (23, m) if m >= 5 => Some("--permission"),
        (22, m) if m >= 13 => Some("--permission"),
        (20, m) if m < 7 => None,
        (m, _) if m >= 20 => Some("--experimental-permission"),
        _ => None,
    }
}

fn io_unavailable(e: std::io::Error) -> ExecutionError {
    ExecutionError::Unavailable(e.to_string())
}

// =============================================================================
// Output Envelope
// =============================================================================

#[derive(Deserialize)]
struct Envelope {
    nonce: String,
    result: Outcome,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Ok(serde_json::Value),
    Error(EnvelopeError),
}

#[derive(Deserialize)]
struct EnvelopeError {
    kind: String,
    message: String,
}

/// Exit status of a container whose process was killed, usually by the
/// memory limit.
const CONTAINER_KILLED: i32 = 137;

fn interpret_output(output: &Output, nonce: &str, limit: Duration) -> Result<Value, ExecutionError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    classify(&stdout, &stderr, output.status.code(), nonce, limit)
}

/// Map the harness output onto a value or an execution error. Only a line
/// carrying `nonce` counts as the harness's result.
fn classify(
    stdout: &str,
    stderr: &str,
    code: Option<i32>,
    nonce: &str,
    limit: Duration,
) -> Result<Value, ExecutionError> {
    let outcome = stdout
        .lines()
        .rev()
        .filter_map(|line| serde_json::from_str::<Envelope>(line.trim()).ok())
        .find(|envelope| envelope.nonce == nonce)
        .map(|envelope| envelope.result);

    match outcome {
        Some(Outcome::Ok(json)) => wire::from_wire(&json)
            .map_err(|e| ExecutionError::Runtime(format!("malformed result: {}", e))),
        Some(Outcome::Error(err)) => Err(match err.kind.as_str() {
            "compile" => ExecutionError::Compile(err.message),
            "timeout" => ExecutionError::Timeout(limit),
            _ => ExecutionError::Runtime(err.message),
        }),
        None if is_heap_exhaustion(stderr) => Err(ExecutionError::ResourceExhausted(
            "JavaScript heap out of memory".to_string(),
        )),
        None if code == Some(CONTAINER_KILLED) => Err(ExecutionError::ResourceExhausted(
            "killed by the memory limit".to_string(),
        )),
        None => {
            let detail = stderr
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(String::from)
                .unwrap_or_else(|| match code {
                    Some(c) => format!("process exited with status {} without a result", c),
                    None => "process terminated by signal".to_string(),
                });
            Err(ExecutionError::Runtime(detail))
        }
    }
}

fn is_heap_exhaustion(stderr: &str) -> bool {
    stderr.contains("heap out of memory") || stderr.contains("Allocation failed")
}
