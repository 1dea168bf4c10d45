//! Model backend layer for Sandcoder.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] - trait every backend implements
//! - [`wire`] - OpenAI-compatible request/response bodies and transcript translation
//! - [`http_provider::HttpProvider`] - HTTP client for OpenAI-compatible endpoints
//! - [`http_provider::create_provider`] - convenience builder from config

pub mod http_provider;
pub mod traits;
pub mod wire;

// Re-export main types for convenience
pub use http_provider::{create_provider, HttpProvider};
pub use traits::{LlmProvider, LlmRequestConfig};
