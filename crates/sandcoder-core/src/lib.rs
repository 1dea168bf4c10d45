//! Sandcoder core - transcript types, configuration, and shared helpers.

pub mod config;
pub mod types;
pub mod utils;

pub use config::Config;
pub use types::{ModelReply, Part, Role, ToolCallRequest, ToolCallResult, ToolDefinition, Transcript, Turn, UsageInfo};
