//! Tool trait - the abstract interface every sandboxed operation implements.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use sandcoder_core::types::ToolDefinition;

use super::sandbox::Sandbox;
use crate::error::ToolError;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The registry advertises tools via `to_definition()`; the dispatcher routes
/// calls by `name()` and hands over the sandbox alongside the model's arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the model to call this tool (e.g. `"read_file"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    /// The sandbox root is never declared here.
    fn parameters(&self) -> Value;

    /// Run the operation inside `sandbox`.
    ///
    /// Every implementation resolves its paths through [`Sandbox::resolve`]
    /// itself, before touching the filesystem.
    async fn execute(&self, sandbox: &Sandbox, args: Map<String, Value>) -> Result<String, ToolError>;

    /// Build the `ToolDefinition` sent to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Argument parsing
// ─────────────────────────────────────────────

/// Parse the model's argument mapping into a tool's typed argument struct.
///
/// Keys the struct doesn't declare are dropped, so a model-supplied
/// `working_directory` has nowhere to go.
pub fn parse_args<T: DeserializeOwned>(args: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}
