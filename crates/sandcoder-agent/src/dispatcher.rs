//! Tool dispatcher - turns one model-issued call into one tagged result.
//!
//! Nothing escapes this boundary: unknown tools, bad arguments, executor
//! errors and even executor panics all come back as a [`ToolCallResult`]
//! the model can read.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sandcoder_core::types::{ToolCallRequest, ToolCallResult, ToolDefinition};

use crate::error::ToolError;
use crate::tools::{Sandbox, Tool, ToolRegistry};

/// Routes calls by name to registered tools, all confined to one sandbox.
pub struct ToolDispatcher {
    registry: ToolRegistry,
    sandbox: Sandbox,
    /// Catalogue computed once; the registry never changes after construction.
    definitions: Vec<ToolDefinition>,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry, sandbox: Sandbox) -> Self {
        let definitions = registry.get_definitions();
        Self {
            registry,
            sandbox,
            definitions,
        }
    }

    /// Tool catalogue advertised to the model, sorted by name.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Execute `call` and wrap the outcome.
    ///
    /// `verbose` raises the call/result diagnostics from `debug` to `info`.
    pub async fn dispatch(&self, call: &ToolCallRequest, verbose: bool) -> ToolCallResult {
        if verbose {
            info!(tool = %call.name, id = %call.id, args = ?call.args, "calling function");
        } else {
            debug!(tool = %call.name, id = %call.id, "calling function");
        }

        let Some(tool) = self.registry.get(&call.name) else {
            warn!(tool = %call.name, "unknown function requested");
            return ToolCallResult::error(&call.id, &call.name, format!("Unknown function: {}", call.name));
        };

        let outcome = match &call.args_error {
            Some(reason) => Err(ToolError::InvalidArguments(reason.clone())),
            None => run_isolated(tool.clone(), self.sandbox.clone(), call).await,
        };

        let result = match outcome {
            Ok(text) => ToolCallResult::result(&call.id, &call.name, text),
            Err(ToolError::InvalidArguments(reason)) => {
                warn!(tool = %call.name, %reason, "invalid arguments");
                ToolCallResult::error(
                    &call.id,
                    &call.name,
                    format!("Invalid arguments for {}: {reason}", call.name),
                )
            }
            Err(e) => {
                debug!(tool = %call.name, error = %e, "tool returned an error");
                ToolCallResult::result(&call.id, &call.name, format!("Error: {e}"))
            }
        };

        if verbose {
            info!(tool = %call.name, response = %result.response, "function result");
        } else {
            debug!(
                tool = %call.name,
                result_len = result.text().map_or(0, str::len),
                "function result"
            );
        }
        result
    }
}

/// Run the tool on its own task so a panic inside it becomes an error.
async fn run_isolated(tool: Arc<dyn Tool>, sandbox: Sandbox, call: &ToolCallRequest) -> Result<String, ToolError> {
    let args = call.args.clone();
    let handle = tokio::spawn(async move { tool.execute(&sandbox, args).await });
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => Err(ToolError::Execution(format!(
            "Error executing {}: tool task failed: {e}",
            call.name
        ))),
    }
}
