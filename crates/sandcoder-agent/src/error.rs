//! Error types for tools and the agent loop.
//!
//! [`ToolError`] values never leave the dispatcher: they are rendered into the
//! tool result so the model can read them and adjust. [`AgentError`] is the
//! small set of conditions that end a user request.

use thiserror::Error;

/// Failure of a single tool call. Always recoverable at the loop level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The resolved path escapes the working directory.
    #[error("Cannot access \"{path}\" as it is outside the permitted working directory")]
    OutOfSandbox { path: String },

    /// Wrong kind of target for this operation (extension, directory vs. file).
    #[error("\"{path}\" {reason}")]
    InvalidTarget { path: String, reason: String },

    /// The target does not exist, or exists as the wrong kind of entry.
    #[error("{kind} not found: \"{path}\"")]
    NotFound { path: String, kind: &'static str },

    /// A script ran past its wall-clock limit and was killed.
    #[error("Execution of \"{path}\" timed out after {secs} seconds")]
    TimedOut { path: String, secs: u64 },

    /// The model's arguments don't fit the tool's parameter schema.
    #[error("{0}")]
    InvalidArguments(String),

    /// Any other runtime fault (I/O errors, spawn failures, panics).
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    pub fn invalid_target(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::InvalidTarget {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// A missing regular file.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        ToolError::NotFound {
            path: path.into(),
            kind: "File",
        }
    }

    /// A missing directory.
    pub fn dir_not_found(path: impl Into<String>) -> Self {
        ToolError::NotFound {
            path: path.into(),
            kind: "Directory",
        }
    }
}

/// Conditions that abort the current user request.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model backend could not produce a reply.
    #[error("model backend failed: {0}")]
    Backend(String),

    /// Requests and results of one pass don't pair up.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Structural mismatch between a model turn's calls and the tool turn.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A requested call has no matching result.
    #[error("no result produced for tool call \"{name}\" ({id})")]
    MissingToolResult { id: String, name: String },

    /// A call produced a result with an empty payload.
    #[error("empty result for tool call \"{name}\" ({id})")]
    EmptyToolResult { id: String, name: String },

    /// The reply requested calls but dispatch yielded nothing.
    #[error("no tool results were produced for {requested} requested call(s)")]
    NoToolResults { requested: usize },

    /// Result count differs from request count.
    #[error("{results} tool result(s) for {requested} requested call(s)")]
    CountMismatch { requested: usize, results: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_messages() {
        let err = ToolError::OutOfSandbox {
            path: "../../etc/passwd".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot access \"../../etc/passwd\" as it is outside the permitted working directory"
        );

        let err = ToolError::invalid_target("notes.txt", "is not a Python file");
        assert_eq!(err.to_string(), "\"notes.txt\" is not a Python file");

        assert_eq!(
            ToolError::file_not_found("main.py").to_string(),
            "File not found: \"main.py\""
        );
        assert_eq!(
            ToolError::dir_not_found("pkg").to_string(),
            "Directory not found: \"pkg\""
        );

        let err = ToolError::TimedOut {
            path: "slow.py".into(),
            secs: 30,
        };
        assert!(err.to_string().contains("timed out after 30 seconds"));
    }

    #[test]
    fn test_agent_error_messages() {
        let err: AgentError = ProtocolError::MissingToolResult {
            id: "call_0".into(),
            name: "read_file".into(),
        }
        .into();
        assert!(err.to_string().starts_with("protocol violation: "));
        assert!(err.to_string().contains("read_file"));
        assert!(ProtocolError::NoToolResults { requested: 2 }
            .to_string()
            .contains("2 requested"));
    }
}
