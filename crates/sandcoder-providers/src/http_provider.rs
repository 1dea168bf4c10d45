//! HTTP model backend for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint. The default base URL is
//! Gemini's OpenAI-compatible endpoint, so a bare `GEMINI_API_KEY` is enough to
//! get going.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use sandcoder_core::config::ProviderConfig;
use sandcoder_core::types::{ModelReply, ToolDefinition, Turn};

use crate::traits::{LlmProvider, LlmRequestConfig};
use crate::wire::{to_messages, ChatCompletionRequest, ChatCompletionResponse};

/// Gemini's OpenAI-compatible API base.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Per-request HTTP timeout.
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A model backend that talks to an OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL.
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Default model for this provider instance.
    default_model: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new HttpProvider from the provider config.
    ///
    /// # Arguments
    /// * `config` - User's config (api_key, api_base, extra_headers)
    /// * `model`  - The default model to use
    pub fn new(config: &ProviderConfig, model: &str) -> anyhow::Result<Self> {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(HttpProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            default_model: model.to_string(),
            extra_headers,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        transcript: &[Turn],
        tools: &[ToolDefinition],
        system: &str,
        model: &str,
        config: &LlmRequestConfig,
    ) -> anyhow::Result<ModelReply> {
        debug!(
            model = %model,
            turns = transcript.len(),
            tools = tools.len(),
            "Calling model"
        );

        let has_tools = !tools.is_empty();
        let request_body = ChatCompletionRequest {
            model: model.to_string(),
            messages: to_messages(system, transcript),
            tools: has_tools.then(|| tools.to_vec()),
            tool_choice: has_tools.then(|| "auto".to_string()),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                anyhow::anyhow!("Error calling model: {e}")
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %error_text, "API error");
            anyhow::bail!("Error calling model: {} - {}", status, error_text);
        }

        let chat_resp = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "Failed to parse model response");
            anyhow::anyhow!("Error parsing model response: {e}")
        })?;

        let reply = chat_resp.into_reply()?;
        debug!(
            parts = reply.parts.len(),
            tool_calls = reply.has_tool_calls(),
            finish_reason = reply.finish_reason.as_deref().unwrap_or("?"),
            "Model reply received"
        );
        Ok(reply)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build an `HttpProvider`, refusing to start without an API key.
pub fn create_provider(config: &ProviderConfig, model: &str) -> anyhow::Result<HttpProvider> {
    if !config.is_configured() {
        anyhow::bail!(
            "No API key configured for model '{}'. \
             Set GEMINI_API_KEY or provider.apiKey in the config file.",
            model
        );
    }

    debug!(
        model = model,
        api_base = config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
        "Creating model provider"
    );

    HttpProvider::new(config, model)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sandcoder_core::types::{Part, ToolCallResult};
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(api_key: &str, api_base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            api_base: api_base.map(String::from),
            extra_headers: None,
        }
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let config = make_config("key", Some("https://api.example.com/v1/"));
        let provider = HttpProvider::new(&config, "gpt-4o").unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_api_base_is_gemini() {
        let config = make_config("key", None);
        let provider = HttpProvider::new(&config, "gemini-2.0-flash-001").unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
    }

    #[test]
    fn test_extra_headers() {
        let mut headers = HashMap::new();
        headers.insert("X-App-Code".to_string(), "my-app-code".to_string());
        let config = ProviderConfig {
            api_key: "key".to_string(),
            api_base: None,
            extra_headers: Some(headers),
        };
        let provider = HttpProvider::new(&config, "gemini-2.0-flash-001").unwrap();
        assert!(provider.extra_headers.contains_key("x-app-code"));
    }

    #[test]
    fn test_create_provider_requires_key() {
        let err = create_provider(&make_config("", None), "gemini-2.0-flash-001").unwrap_err();
        assert!(err.to_string().contains("No API key"));
    }

    #[test]
    fn test_create_provider_success() {
        let provider = create_provider(&make_config("k", None), "gemini-2.0-flash-001").unwrap();
        assert_eq!(provider.default_model(), "gemini-2.0-flash-001");
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_chat_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "content": "All done.", "tool_calls": null },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
            })))
            .mount(&mock_server)
            .await;

        let config = make_config("test-key-123", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, "gemini-2.0-flash-001").unwrap();

        let reply = provider
            .chat(
                &[Turn::user("Hello")],
                &[],
                "You are helpful.",
                "gemini-2.0-flash-001",
                &LlmRequestConfig::default(),
            )
            .await
            .unwrap();

        assert_eq!(reply.parts, vec![Part::text("All done.")]);
        assert_eq!(reply.usage.unwrap().prompt_tokens, 10);
    }

    #[tokio::test]
    async fn test_chat_sends_tools_and_tool_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gemini-2.0-flash-001",
                "tool_choice": "auto",
                "tools": [{ "type": "function", "function": { "name": "list_directory" } }],
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "list" },
                    { "role": "assistant" },
                    { "role": "tool", "tool_call_id": "call_0" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "content": "ok" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&mock_server)
            .await;

        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, "gemini-2.0-flash-001").unwrap();

        let tool_def = ToolDefinition::new(
            "list_directory",
            "List files",
            serde_json::json!({"type": "object", "properties": {}}),
        );
        let call = sandcoder_core::types::ToolCallRequest::new(
            "call_0",
            "list_directory",
            serde_json::Map::new(),
        );
        let transcript = vec![
            Turn::user("list"),
            Turn::model(vec![Part::FunctionCall(call)]),
            Turn::tool(vec![ToolCallResult::result("call_0", "list_directory", "- a.py")]),
        ];

        let reply = provider
            .chat(
                &transcript,
                &[tool_def],
                "sys",
                "gemini-2.0-flash-001",
                &LlmRequestConfig::default(),
            )
            .await
            .unwrap();

        // If the body matcher fails, wiremock returns 404 → we'd get an error
        assert_eq!(reply.parts, vec![Part::text("ok")]);
    }

    #[tokio::test]
    async fn test_chat_with_tool_calls() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc123",
                            "type": "function",
                            "function": {
                                "name": "read_file",
                                "arguments": "{\"file_path\": \"main.py\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&mock_server)
            .await;

        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, "gemini-2.0-flash-001").unwrap();

        let reply = provider
            .chat(
                &[Turn::user("read main.py")],
                &[],
                "",
                "gemini-2.0-flash-001",
                &LlmRequestConfig::default(),
            )
            .await
            .unwrap();

        assert!(reply.has_tool_calls());
        let call = reply.parts[0].as_function_call().unwrap();
        assert_eq!(call.id, "call_abc123");
        assert_eq!(call.name, "read_file");
        assert_eq!(call.args["file_path"], "main.py");
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit exceeded" }
            })))
            .mount(&mock_server)
            .await;

        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, "gemini-2.0-flash-001").unwrap();

        let err = provider
            .chat(
                &[Turn::user("Hello")],
                &[],
                "",
                "gemini-2.0-flash-001",
                &LlmRequestConfig::default(),
            )
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Error calling model"));
        assert!(msg.contains("429"));
    }

    #[tokio::test]
    async fn test_chat_network_error() {
        // Point to a port that's not listening
        let config = make_config("key", Some("http://127.0.0.1:1"));
        let provider = HttpProvider::new(&config, "gemini-2.0-flash-001").unwrap();

        let err = provider
            .chat(
                &[Turn::user("Hello")],
                &[],
                "",
                "gemini-2.0-flash-001",
                &LlmRequestConfig::default(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Error calling model"));
    }
}
