//! Config loader - reads `~/.sandcoder/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.sandcoder/config.json` (or an explicit path)
//! 3. Environment variables `SANDCODER_<SECTION>__<FIELD>` (override JSON)
//! 4. `GEMINI_API_KEY`, only when no API key was set by the steps above

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Apply environment variable overrides from the process environment.
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides looked up through `var`.
///
/// Supported keys:
/// - `SANDCODER_AGENT__MODEL` → `agent.model`
/// - `SANDCODER_AGENT__MAX_ITERATIONS` → `agent.max_iterations`
/// - `SANDCODER_AGENT__MAX_TOKENS` → `agent.max_tokens`
/// - `SANDCODER_AGENT__TEMPERATURE` → `agent.temperature`
/// - `SANDCODER_AGENT__WORKSPACE` → `agent.workspace`
/// - `SANDCODER_PROVIDER__API_KEY` → `provider.api_key`
/// - `SANDCODER_PROVIDER__API_BASE` → `provider.api_base`
/// - `SANDCODER_TOOLS__RUN_TIMEOUT_SECS` → `tools.run_timeout_secs`
/// - `SANDCODER_TOOLS__PYTHON_INTERPRETER` → `tools.python_interpreter`
/// - `GEMINI_API_KEY` → `provider.api_key` (fallback only)
fn apply_overrides<F>(mut config: Config, var: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = var("SANDCODER_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(n) = var("SANDCODER_AGENT__MAX_ITERATIONS").and_then(|v| v.parse::<u32>().ok()) {
        config.agent.max_iterations = n;
    }
    if let Some(n) = var("SANDCODER_AGENT__MAX_TOKENS").and_then(|v| v.parse::<u32>().ok()) {
        config.agent.max_tokens = n;
    }
    if let Some(t) = var("SANDCODER_AGENT__TEMPERATURE").and_then(|v| v.parse::<f64>().ok()) {
        config.agent.temperature = t;
    }
    if let Some(val) = var("SANDCODER_AGENT__WORKSPACE") {
        config.agent.workspace = val;
    }

    if let Some(val) = var("SANDCODER_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = var("SANDCODER_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }

    if let Some(n) = var("SANDCODER_TOOLS__RUN_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
        config.tools.run_timeout_secs = n;
    }
    if let Some(val) = var("SANDCODER_TOOLS__PYTHON_INTERPRETER") {
        config.tools.python_interpreter = val;
    }

    if !config.provider.is_configured() {
        if let Some(key) = var("GEMINI_API_KEY") {
            debug!("Using GEMINI_API_KEY for provider.apiKey");
            config.provider.api_key = key;
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
