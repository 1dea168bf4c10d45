//! Model backend trait - the seam between the agent loop and any LLM API.
//!
//! The `HttpProvider` in `http_provider.rs` covers OpenAI-compatible APIs,
//! including Gemini's compatibility endpoint.

use async_trait::async_trait;
use sandcoder_core::types::{ModelReply, ToolDefinition, Turn};

/// Configuration passed to each model call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Trait that all model backends must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the transcript and tool catalogue, get the model's next reply.
    ///
    /// # Arguments
    /// * `transcript` - Ordered conversation turns so far.
    /// * `tools`      - The tool catalogue the model may call.
    /// * `system`     - System instructions.
    /// * `model`      - Model identifier (e.g. `"gemini-2.0-flash-001"`).
    /// * `config`     - Temperature, max_tokens, etc.
    ///
    /// # Errors
    /// Transport failures, non-success HTTP statuses, and unparseable bodies.
    async fn chat(
        &self,
        transcript: &[Turn],
        tools: &[ToolDefinition],
        system: &str,
        model: &str,
        config: &LlmRequestConfig,
    ) -> anyhow::Result<ModelReply>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
