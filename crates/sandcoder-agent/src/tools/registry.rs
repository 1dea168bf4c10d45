//! Tool Registry - the fixed set of operations offered to the model.
//!
//! Built once at startup; the dispatcher looks tools up here by name and the
//! agent loop advertises `get_definitions()` on every model request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sandcoder_core::config::ToolsConfig;
use sandcoder_core::types::ToolDefinition;
use tracing::debug;

use super::base::Tool;
use super::filesystem::{ListDirectoryTool, ReadFileTool, WriteFileTool};
use super::python::RunPythonFileTool;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name.
///
/// Owns `Arc<dyn Tool>` so the dispatcher can hand a tool to a spawned task.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry holding the four sandboxed operations, configured from `tools`.
    pub fn with_defaults(tools: &ToolsConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ListDirectoryTool));
        registry.register(Arc::new(ReadFileTool::new(tools.max_file_chars)));
        registry.register(Arc::new(WriteFileTool));
        registry.register(Arc::new(RunPythonFileTool::new(
            tools.python_interpreter.clone(),
            Duration::from_secs(tools.run_timeout_secs),
            tools.max_output_chars,
        )));
        registry
    }

    /// Register a tool. Overwrites any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!(tool = tool.name(), "registered tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Get the model-facing definitions for all registered tools.
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        defs
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
