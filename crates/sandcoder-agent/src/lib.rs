//! Sandcoder Agent - core loop, tool dispatch, and sandboxed tools.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, sandbox, and the four built-in operations
//! - **dispatcher**: Routes model-issued calls to tools and wraps the results
//! - **context**: System instructions
//! - **agent_loop**: The model ↔ tool-calling state machine

pub mod agent_loop;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod tools;

pub use agent_loop::{AgentLoop, AgentLoopConfig, AgentOutcome, Termination};
pub use dispatcher::ToolDispatcher;
pub use error::{AgentError, ProtocolError, ToolError};
pub use tools::{Sandbox, Tool, ToolRegistry};
