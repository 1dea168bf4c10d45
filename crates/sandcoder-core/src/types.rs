//! Core types for Sandcoder - the conversation transcript and tool-call envelopes.
//!
//! A transcript is an append-only list of [`Turn`]s. Each turn carries a
//! [`Role`] and an ordered list of [`Part`]s: plain text, a tool-call request
//! issued by the model, or a tool-call result produced by the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────
// Turns and parts
// ─────────────────────────────────────────────

/// Who produced a turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    Tool,
}

/// A single piece of a turn.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text { text: String },
    /// The model asks for a tool to be run.
    FunctionCall(ToolCallRequest),
    /// The outcome of a tool run, answering a `FunctionCall`.
    FunctionResponse(ToolCallResult),
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// The request carried by this part, if it is a function call.
    pub fn as_function_call(&self) -> Option<&ToolCallRequest> {
        match self {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    /// The result carried by this part, if it is a function response.
    pub fn as_function_response(&self) -> Option<&ToolCallResult> {
        match self {
            Part::FunctionResponse(result) => Some(result),
            _ => None,
        }
    }
}

/// One entry of the conversation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    /// A user turn holding a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Turn {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// A model turn with the given parts.
    pub fn model(parts: Vec<Part>) -> Self {
        Turn {
            role: Role::Model,
            parts,
        }
    }

    /// A tool turn answering the previous model turn's calls, in order.
    pub fn tool(results: Vec<ToolCallResult>) -> Self {
        Turn {
            role: Role::Tool,
            parts: results.into_iter().map(Part::FunctionResponse).collect(),
        }
    }

    /// Tool-call requests in this turn, in the order they appear.
    pub fn function_calls(&self) -> Vec<&ToolCallRequest> {
        self.parts.iter().filter_map(Part::as_function_call).collect()
    }

    /// Text parts concatenated, or `None` if there are none.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(""))
        }
    }
}

/// Append-only conversation history for one user request.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Start a transcript seeded with the user's request.
    pub fn new(prompt: impl Into<String>) -> Self {
        Transcript {
            turns: vec![Turn::user(prompt)],
        }
    }

    /// Append a turn. Turns are never removed or rewritten.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

// ─────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────

/// A function invocation requested by the model.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    /// Identity used to pair the call with its result.
    pub id: String,
    /// Tool name as advertised in the catalogue.
    pub name: String,
    /// Model-supplied arguments.
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Set when the model's argument text could not be decoded into `args`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args_error: Option<String>,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Map<String, Value>) -> Self {
        ToolCallRequest {
            id: id.into(),
            name: name.into(),
            args,
            args_error: None,
        }
    }

    /// A call whose arguments arrived but could not be decoded.
    pub fn malformed(id: impl Into<String>, name: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolCallRequest {
            id: id.into(),
            name: name.into(),
            args: Map::new(),
            args_error: Some(reason.into()),
        }
    }
}

/// The dispatcher's answer to a [`ToolCallRequest`].
///
/// `response` is `{"result": ...}` for executor output and `{"error": ...}`
/// when the call could not be routed to an executor at all.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCallResult {
    pub id: String,
    pub name: String,
    pub response: Value,
}

impl ToolCallResult {
    /// Wrap executor output.
    pub fn result(id: impl Into<String>, name: impl Into<String>, text: impl Into<String>) -> Self {
        ToolCallResult {
            id: id.into(),
            name: name.into(),
            response: serde_json::json!({ "result": text.into() }),
        }
    }

    /// Wrap a dispatch-level failure.
    pub fn error(id: impl Into<String>, name: impl Into<String>, message: impl Into<String>) -> Self {
        ToolCallResult {
            id: id.into(),
            name: name.into(),
            response: serde_json::json!({ "error": message.into() }),
        }
    }

    /// Whether the payload is an `error` envelope.
    pub fn is_error(&self) -> bool {
        self.response.get("error").is_some()
    }

    /// The text inside the envelope (`result` or `error`), if any.
    pub fn text(&self) -> Option<&str> {
        self.response
            .get("result")
            .or_else(|| self.response.get("error"))
            .and_then(|v| v.as_str())
    }
}

// ─────────────────────────────────────────────
// Tool Definitions (catalogue entries)
// ─────────────────────────────────────────────

/// Definition of a tool, sent to the model so it knows what it can call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function schema.
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

// ─────────────────────────────────────────────
// Model reply
// ─────────────────────────────────────────────

/// What the model backend returns for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelReply {
    /// Text and/or function-call parts, in the order the model produced them.
    pub parts: Vec<Part>,
    /// Token usage statistics, when the backend reports them.
    pub usage: Option<UsageInfo>,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
}

impl ModelReply {
    /// A reply consisting of a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        ModelReply {
            parts: vec![Part::text(text)],
            ..Default::default()
        }
    }

    /// A reply requesting the given tool calls.
    pub fn calls(calls: Vec<ToolCallRequest>) -> Self {
        ModelReply {
            parts: calls.into_iter().map(Part::FunctionCall).collect(),
            ..Default::default()
        }
    }

    /// Whether the reply contains tool-call requests.
    pub fn has_tool_calls(&self) -> bool {
        self.parts.iter().any(|p| p.as_function_call().is_some())
    }
}

/// Token usage statistics from the model.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl UsageInfo {
    /// Add another reply's usage to this running total.
    pub fn accumulate(&mut self, other: &UsageInfo) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
