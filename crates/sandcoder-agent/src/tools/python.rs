//! Script tool - run a Python file inside the sandbox with a hard timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::process::Command;
use tracing::{info, warn};

use sandcoder_core::utils::split_at_chars;

use super::base::{parse_args, Tool};
use super::sandbox::Sandbox;
use crate::error::ToolError;

/// Default wall-clock limit for one script run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum output length before truncation (characters).
const DEFAULT_MAX_OUTPUT_LEN: usize = 10_000;

#[derive(Deserialize)]
struct RunPythonFileArgs {
    file_path: String,
    #[serde(default)]
    args: Vec<String>,
}

// ─────────────────────────────────────────────
// RunPythonFileTool
// ─────────────────────────────────────────────

/// Execute a `.py` file with the configured interpreter.
pub struct RunPythonFileTool {
    /// Interpreter binary (e.g. `python3`).
    interpreter: String,
    /// Wall-clock limit; the child is killed when it expires.
    timeout: Duration,
    /// Captured output beyond this is cut.
    max_output_len: usize,
}

impl RunPythonFileTool {
    pub fn new(interpreter: impl Into<String>, timeout: Duration, max_output_len: usize) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
            max_output_len,
        }
    }
}

impl Default for RunPythonFileTool {
    fn default() -> Self {
        Self::new(
            "python3",
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            DEFAULT_MAX_OUTPUT_LEN,
        )
    }
}

#[async_trait]
impl Tool for RunPythonFileTool {
    fn name(&self) -> &str {
        "run_python_file"
    }

    fn description(&self) -> &str {
        "Executes a Python file with the Python 3 interpreter, constrained to the working directory. \
         Accepts additional command-line arguments as an optional array."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the Python file to execute, relative to the working directory."
                },
                "args": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional command-line arguments passed to the script."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, sandbox: &Sandbox, args: Map<String, Value>) -> Result<String, ToolError> {
        let RunPythonFileArgs { file_path, args } = parse_args(args)?;
        let path = sandbox.resolve(&file_path)?;

        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            return Err(ToolError::invalid_target(file_path, "is not a Python file"));
        }
        if !path.is_file() {
            return Err(ToolError::file_not_found(file_path));
        }

        info!(script = %file_path, args = ?args, "running python file");

        let child = Command::new(&self.interpreter)
            .arg(&path)
            .args(&args)
            .current_dir(sandbox.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::Execution(format!("Failed to start {}: {e}", self.interpreter)))?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::Execution(format!(
                    "Error executing \"{file_path}\": {e}"
                )));
            }
            Err(_) => {
                warn!(script = %file_path, "python file timed out");
                return Err(ToolError::TimedOut {
                    path: file_path,
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(format_output(
            &stdout,
            &stderr,
            output.status.code(),
            self.max_output_len,
        ))
    }
}

/// Render captured streams, putting any failure status first.
fn format_output(stdout: &str, stderr: &str, code: Option<i32>, max_len: usize) -> String {
    let mut body = String::new();
    if !stdout.is_empty() {
        body.push_str("STDOUT: ");
        body.push_str(stdout);
        if !stdout.ends_with('\n') {
            body.push('\n');
        }
    }
    if !stderr.is_empty() {
        body.push_str("STDERR: ");
        body.push_str(stderr);
        if !stderr.ends_with('\n') {
            body.push('\n');
        }
    }
    if body.is_empty() {
        body.push_str("No output produced.\n");
    }

    let (kept, dropped) = split_at_chars(&body, max_len);
    let mut body = kept.to_string();
    if dropped > 0 {
        body.push_str(&format!("\n... (truncated, {dropped} more chars)"));
    }

    match code {
        Some(0) => body,
        Some(code) => format!("Process exited with code {code}\n{body}"),
        None => format!("Process terminated by signal\n{body}"),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
