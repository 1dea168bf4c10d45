//! Agent loop - the model ↔ tool-calling state machine for one user request.
//!
//! Each pass sends the transcript, the tool catalogue and the system
//! instructions to the backend. A reply without tool calls ends the request;
//! otherwise every call is dispatched in order, the results are appended as
//! one `tool` turn and the loop goes round again, up to the iteration cap.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use sandcoder_core::config::{Config, DEFAULT_MAX_ITERATIONS};
use sandcoder_core::types::{Part, ToolCallRequest, ToolCallResult, Transcript, Turn, UsageInfo};
use sandcoder_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::context::SYSTEM_PROMPT;
use crate::dispatcher::ToolDispatcher;
use crate::error::{AgentError, ProtocolError};

// ─────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────

/// Per-process settings for the loop.
#[derive(Clone, Debug)]
pub struct AgentLoopConfig {
    /// Model identifier. Empty means the provider's default.
    pub model: String,
    /// Maximum backend calls for one request.
    pub max_iterations: u32,
    /// Temperature and token limits for each call.
    pub request: LlmRequestConfig,
    pub system_prompt: String,
    /// Raise call/result and usage diagnostics to `info`.
    pub verbose: bool,
}

impl AgentLoopConfig {
    pub fn from_config(config: &Config, verbose: bool) -> Self {
        Self {
            model: config.agent.model.clone(),
            max_iterations: config.agent.max_iterations,
            request: LlmRequestConfig {
                max_tokens: config.agent.max_tokens,
                temperature: config.agent.temperature,
            },
            system_prompt: SYSTEM_PROMPT.to_string(),
            verbose,
        }
    }
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            request: LlmRequestConfig::default(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            verbose: false,
        }
    }
}

// ─────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────

/// How a request ended, when it didn't fail.
#[derive(Clone, Debug, PartialEq)]
pub enum Termination {
    /// The model replied without tool calls.
    Completed { answer: String },
    /// The pass budget ran out before a final answer.
    IterationCapReached,
}

/// Terminal state of one [`AgentLoop::run`].
#[derive(Clone, Debug)]
pub struct AgentOutcome {
    pub termination: Termination,
    /// Every turn of the request, in order.
    pub transcript: Transcript,
    /// Number of backend calls made.
    pub iterations: u32,
    /// Token usage summed over all replies that reported it.
    pub usage: UsageInfo,
}

impl AgentOutcome {
    /// The model's final text, if the request completed.
    pub fn final_answer(&self) -> Option<&str> {
        match &self.termination {
            Termination::Completed { answer } => Some(answer),
            Termination::IterationCapReached => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.termination, Termination::Completed { .. })
    }
}

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

/// Drives one request from prompt to final answer.
pub struct AgentLoop {
    provider: Arc<dyn LlmProvider>,
    dispatcher: ToolDispatcher,
    config: AgentLoopConfig,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn LlmProvider>, dispatcher: ToolDispatcher, config: AgentLoopConfig) -> Self {
        info!(
            provider = provider.display_name(),
            tools = dispatcher.definitions().len(),
            max_iterations = config.max_iterations,
            workspace = %dispatcher.sandbox().root().display(),
            "agent loop initialized"
        );
        Self {
            provider,
            dispatcher,
            config,
        }
    }

    /// Model used for requests (the configured one, else the provider's default).
    pub fn model(&self) -> &str {
        if self.config.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.config.model
        }
    }

    pub fn config(&self) -> &AgentLoopConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Run the loop for `prompt` until a final answer or the iteration cap.
    ///
    /// # Errors
    /// [`AgentError::Backend`] when the model call fails and
    /// [`AgentError::Protocol`] when a pass's results don't pair with its calls.
    pub async fn run(&self, prompt: &str) -> Result<AgentOutcome, AgentError> {
        let verbose = self.config.verbose;
        let model = self.model();
        let mut transcript = Transcript::new(prompt);
        let mut usage = UsageInfo::default();
        let mut iterations: u32 = 0;

        loop {
            if iterations >= self.config.max_iterations {
                warn!(iterations, "maximum iterations reached without a final answer");
                return Ok(AgentOutcome {
                    termination: Termination::IterationCapReached,
                    transcript,
                    iterations,
                    usage,
                });
            }
            iterations += 1;
            debug!(iteration = iterations, turns = transcript.len(), "model call");

            let reply = self
                .provider
                .chat(
                    transcript.turns(),
                    self.dispatcher.definitions(),
                    &self.config.system_prompt,
                    model,
                    &self.config.request,
                )
                .await
                .map_err(|e| {
                    error!(iteration = iterations, error = %e, "model call failed");
                    AgentError::Backend(format!("{e:#}"))
                })?;

            if let Some(reply_usage) = &reply.usage {
                usage.accumulate(reply_usage);
                if verbose {
                    info!(
                        iteration = iterations,
                        prompt_tokens = reply_usage.prompt_tokens,
                        response_tokens = reply_usage.completion_tokens,
                        "token usage"
                    );
                } else {
                    debug!(iteration = iterations, total_tokens = reply_usage.total_tokens, "token usage");
                }
            }

            let calls: Vec<ToolCallRequest> = reply
                .parts
                .iter()
                .filter_map(Part::as_function_call)
                .cloned()
                .collect();
            transcript.push(Turn::model(reply.parts));

            if calls.is_empty() {
                let answer = transcript.last().and_then(Turn::text).unwrap_or_default();
                info!(iterations, "final answer received");
                return Ok(AgentOutcome {
                    termination: Termination::Completed { answer },
                    transcript,
                    iterations,
                    usage,
                });
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                info!(tool = %call.name, iteration = iterations, "executing tool call");
                results.push(self.dispatcher.dispatch(call, verbose).await);
            }

            check_pairing(&calls, &results)?;
            transcript.push(Turn::tool(results));
        }
    }
}

/// Every call must have exactly one non-empty result, in request order.
fn check_pairing(calls: &[ToolCallRequest], results: &[ToolCallResult]) -> Result<(), ProtocolError> {
    if results.is_empty() {
        return Err(ProtocolError::NoToolResults {
            requested: calls.len(),
        });
    }
    if results.len() != calls.len() {
        return Err(ProtocolError::CountMismatch {
            requested: calls.len(),
            results: results.len(),
        });
    }
    for (call, result) in calls.iter().zip(results) {
        if result.id != call.id || result.name != call.name {
            return Err(ProtocolError::MissingToolResult {
                id: call.id.clone(),
                name: call.name.clone(),
            });
        }
        let empty = match &result.response {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if empty {
            return Err(ProtocolError::EmptyToolResult {
                id: call.id.clone(),
                name: call.name.clone(),
            });
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
