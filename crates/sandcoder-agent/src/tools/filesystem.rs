//! Filesystem tools - list directory, read file, write file.
//!
//! All paths are relative to the sandbox root and resolved through
//! [`Sandbox::resolve`] before any filesystem access.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use sandcoder_core::utils::split_at_chars;

use super::base::{parse_args, Tool};
use super::sandbox::Sandbox;
use crate::error::ToolError;

/// Default `read_file` truncation limit, in characters.
pub const DEFAULT_MAX_FILE_CHARS: usize = 10_000;

fn io_error(action: &str, path: &str, e: std::io::Error) -> ToolError {
    ToolError::Execution(format!("Failed to {action} \"{path}\": {e}"))
}

// ─────────────────────────────────────────────
// ListDirectoryTool
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct ListDirectoryArgs {
    #[serde(default = "current_dir")]
    directory: String,
}

fn current_dir() -> String {
    ".".to_string()
}

/// Lists a directory's entries with size and kind.
pub struct ListDirectoryTool;

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "Lists files in the specified directory along with their sizes, constrained to the working directory."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "The directory to list files from, relative to the working directory. If not provided, lists files in the working directory itself."
                }
            },
            "required": []
        })
    }

    async fn execute(&self, sandbox: &Sandbox, args: Map<String, Value>) -> Result<String, ToolError> {
        let ListDirectoryArgs { directory } = parse_args(args)?;
        let path = sandbox.resolve(&directory)?;

        if !path.exists() {
            return Err(ToolError::dir_not_found(directory));
        }
        if !path.is_dir() {
            return Err(ToolError::invalid_target(directory, "is not a directory"));
        }

        let mut entries: Vec<_> = std::fs::read_dir(&path)
            .map_err(|e| io_error("read directory", &directory, e))?
            .filter_map(|e| e.ok())
            .collect();
        entries.sort_by_key(|e| e.file_name());

        let mut lines = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            let metadata = entry
                .metadata()
                .map_err(|e| io_error("stat", &name, e))?;
            lines.push(format!(
                "- {name}: file_size={} bytes, is_dir={}",
                metadata.len(),
                metadata.is_dir()
            ));
        }

        if lines.is_empty() {
            Ok("(empty directory)".into())
        } else {
            Ok(lines.join("\n"))
        }
    }
}

// ─────────────────────────────────────────────
// ReadFileTool
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct ReadFileArgs {
    file_path: String,
}

/// Returns the text content of a file, truncated past `max_chars`.
pub struct ReadFileTool {
    max_chars: usize,
}

impl ReadFileTool {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_CHARS)
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads and returns the text content of a file, constrained to the working directory. Long files are truncated."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to read, relative to the working directory."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, sandbox: &Sandbox, args: Map<String, Value>) -> Result<String, ToolError> {
        let ReadFileArgs { file_path } = parse_args(args)?;
        let path = sandbox.resolve(&file_path)?;

        if !path.is_file() {
            return Err(ToolError::file_not_found(file_path));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| io_error("read", &file_path, e))?;

        let (kept, dropped) = split_at_chars(&content, self.max_chars);
        if dropped == 0 {
            return Ok(content);
        }
        Ok(format!(
            "{kept}[...File \"{file_path}\" truncated at {} characters]",
            self.max_chars
        ))
    }
}

// ─────────────────────────────────────────────
// WriteFileTool
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct WriteFileArgs {
    file_path: String,
    content: String,
}

/// Creates or overwrites a file, creating parent directories as needed.
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file, creating it (and any parent directories) or overwriting it, constrained to the working directory."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to write, relative to the working directory."
                },
                "content": {
                    "type": "string",
                    "description": "The full content to write to the file."
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, sandbox: &Sandbox, args: Map<String, Value>) -> Result<String, ToolError> {
        let WriteFileArgs { file_path, content } = parse_args(args)?;
        let path = sandbox.resolve(&file_path)?;

        if path.is_dir() {
            return Err(ToolError::invalid_target(file_path, "is a directory"));
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| io_error("create parent directories for", &file_path, e))?;
            }
        }

        std::fs::write(&path, &content).map_err(|e| io_error("write", &file_path, e))?;
        Ok(format!(
            "Successfully wrote to \"{file_path}\" ({} characters written)",
            content.chars().count()
        ))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
