//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// Default cap on model round-trips per user request.
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration - loaded from `~/.sandcoder/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub tools: ToolsConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Agent loop settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Sandbox root. Every tool call is confined to this directory.
    pub workspace: String,
    /// Model identifier sent to the backend.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum model round-trips before the request is aborted.
    pub max_iterations: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            workspace: ".".to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 8192,
            temperature: 0.7,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Model backend connection settings (API key, base URL, headers).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides the built-in default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Limits and settings for the sandboxed tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Wall-clock limit for `run_python_file`, in seconds.
    pub run_timeout_secs: u64,
    /// Interpreter used by `run_python_file`.
    pub python_interpreter: String,
    /// `read_file` truncates content beyond this many characters.
    pub max_file_chars: usize,
    /// `run_python_file` truncates captured output beyond this many characters.
    pub max_output_chars: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            run_timeout_secs: 30,
            python_interpreter: "python3".to_string(),
            max_file_chars: 10_000,
            max_output_chars: 10_000,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gemini-2.0-flash-001");
        assert_eq!(config.agent.max_iterations, 20);
        assert_eq!(config.agent.workspace, ".");
        assert_eq!(config.tools.run_timeout_secs, 30);
        assert_eq!(config.tools.python_interpreter, "python3");
        assert!(!config.provider.is_configured());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["agent"].get("maxIterations").is_some());
        assert!(json["tools"].get("runTimeoutSecs").is_some());
        assert!(json["provider"].get("apiKey").is_some());
        // None fields are omitted
        assert!(json["provider"].get("apiBase").is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"tools": {"maxFileChars": 50}}"#).unwrap();
        assert_eq!(config.tools.max_file_chars, 50);
        assert_eq!(config.tools.run_timeout_secs, 30);
        assert_eq!(config.agent.max_iterations, 20);
    }
}
