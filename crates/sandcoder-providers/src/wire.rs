//! Wire format for OpenAI-compatible `/chat/completions` APIs.
//!
//! The agent works with [`Turn`]s and [`Part`]s; these types are only the
//! translation layer between that transcript and the JSON the endpoint speaks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use sandcoder_core::types::{
    ModelReply, Part, Role, ToolCallRequest, ToolDefinition, Turn, UsageInfo,
};

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// A chat message. Each variant maps to a `role` field value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    #[serde(rename = "tool")]
    Tool {
        content: String,
        tool_call_id: String,
    },
}

/// A tool call on the wire; `arguments` is a JSON-encoded string.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    /// Always "function" in current OpenAI API.
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// The function name and arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl From<&ToolCallRequest> for ToolCall {
    fn from(call: &ToolCallRequest) -> Self {
        ToolCall {
            id: call.id.clone(),
            call_type: function_type(),
            function: FunctionCall {
                name: call.name.clone(),
                arguments: Value::Object(call.args.clone()).to_string(),
            },
        }
    }
}

/// Flatten the system instructions and transcript into wire messages.
///
/// A `tool` turn becomes one `tool` message per result, in order, so each
/// result stays paired with its call id.
pub fn to_messages(system: &str, transcript: &[Turn]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    if !system.is_empty() {
        messages.push(Message::System {
            content: system.to_string(),
        });
    }

    for turn in transcript {
        match turn.role {
            Role::User => messages.push(Message::User {
                content: turn.text().unwrap_or_default(),
            }),
            Role::Model => {
                let calls: Vec<ToolCall> = turn
                    .function_calls()
                    .into_iter()
                    .map(ToolCall::from)
                    .collect();
                messages.push(Message::Assistant {
                    content: turn.text(),
                    tool_calls: if calls.is_empty() { None } else { Some(calls) },
                });
            }
            Role::Tool => {
                for part in &turn.parts {
                    if let Part::FunctionResponse(result) = part {
                        messages.push(Message::Tool {
                            content: result.response.to_string(),
                            tool_call_id: result.id.clone(),
                        });
                    }
                }
            }
        }
    }

    messages
}

// ─────────────────────────────────────────────
// Request / response bodies
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatCompletionResponse {
    /// Convert the first choice into a [`ModelReply`].
    ///
    /// Calls without an id get `call_<position>`. Argument text that is not a
    /// JSON object yields a malformed call, which the dispatcher refuses to run.
    pub fn into_reply(self) -> anyhow::Result<ModelReply> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No choices in response"))?;

        let mut parts = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            parts.push(Part::text(text));
        }
        for (position, call) in choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            let id = if call.id.is_empty() {
                format!("call_{position}")
            } else {
                call.id
            };
            let request = match parse_arguments(&call.function.name, &call.function.arguments) {
                Ok(args) => ToolCallRequest::new(id, call.function.name, args),
                Err(reason) => ToolCallRequest::malformed(id, call.function.name, reason),
            };
            parts.push(Part::FunctionCall(request));
        }

        Ok(ModelReply {
            parts,
            usage: self.usage,
            finish_reason: choice.finish_reason,
        })
    }
}

/// Decode the model's argument string. Blank text means no arguments.
fn parse_arguments(name: &str, raw: &str) -> Result<Map<String, Value>, String> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            warn!(tool = name, arguments = %other, "tool arguments are not an object");
            Err(format!("expected a JSON object, got {other}"))
        }
        Err(e) => {
            warn!(tool = name, error = %e, "failed to parse tool arguments");
            Err(format!("malformed JSON: {e}"))
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sandcoder_core::types::ToolCallResult;
    use serde_json::json;

    fn call(id: &str, name: &str, args: Value) -> ToolCallRequest {
        ToolCallRequest::new(id, name, args.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_to_messages_full_exchange() {
        let transcript = vec![
            Turn::user("What's in the root?"),
            Turn::model(vec![Part::FunctionCall(call(
                "call_1",
                "list_directory",
                json!({"directory": "."}),
            ))]),
            Turn::tool(vec![ToolCallResult::result("call_1", "list_directory", "- a.py")]),
            Turn::model(vec![Part::text("There is a.py")]),
        ];

        let messages = to_messages("Be helpful.", &transcript);
        assert_eq!(messages.len(), 5);
        assert_eq!(
            messages[0],
            Message::System {
                content: "Be helpful.".into()
            }
        );

        let json = serde_json::to_value(&messages).unwrap();
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[2]["role"], "assistant");
        assert!(json[2].get("content").is_none());
        assert_eq!(json[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(json[2]["tool_calls"][0]["type"], "function");
        assert_eq!(
            json[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"directory":"."}"#
        );
        assert_eq!(json[3]["role"], "tool");
        assert_eq!(json[3]["tool_call_id"], "call_1");
        assert_eq!(json[3]["content"], r#"{"result":"- a.py"}"#);
        assert_eq!(json[4]["content"], "There is a.py");
        assert!(json[4].get("tool_calls").is_none());
    }

    #[test]
    fn test_tool_turn_splits_into_messages_in_order() {
        let transcript = vec![Turn::tool(vec![
            ToolCallResult::result("a", "read_file", "one"),
            ToolCallResult::error("b", "bogus", "Unknown function: bogus"),
        ])];
        let messages = to_messages("", &transcript);
        assert_eq!(messages.len(), 2);
        match &messages[1] {
            Message::Tool { tool_call_id, content } => {
                assert_eq!(tool_call_id, "b");
                assert!(content.contains("Unknown function"));
            }
            other => panic!("Expected tool message, got {other:?}"),
        }
    }

    #[test]
    fn test_response_with_tool_calls() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-xyz",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [
                        {
                            "id": "",
                            "type": "function",
                            "function": {
                                "name": "run_python_file",
                                "arguments": "{\"file_path\": \"sort.py\", \"args\": [\"3,1,2\"]}"
                            }
                        },
                        {
                            "id": "abc",
                            "type": "function",
                            "function": { "name": "list_directory", "arguments": "" }
                        }
                    ]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 50, "completion_tokens": 20, "total_tokens": 70 }
        }))
        .unwrap();

        let reply = resp.into_reply().unwrap();
        assert!(reply.has_tool_calls());
        assert_eq!(reply.parts.len(), 2);

        let first = reply.parts[0].as_function_call().unwrap();
        assert_eq!(first.id, "call_0");
        assert_eq!(first.name, "run_python_file");
        assert_eq!(first.args["args"], json!(["3,1,2"]));

        let second = reply.parts[1].as_function_call().unwrap();
        assert_eq!(second.id, "abc");
        assert!(second.args.is_empty());

        assert_eq!(reply.usage.unwrap().total_tokens, 70);
        assert_eq!(reply.finish_reason.as_deref(), Some("tool_calls"));
    }

    #[test]
    fn test_response_bad_arguments_are_flagged() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "id": "x",
                        "function": { "name": "read_file", "arguments": "{not json" }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();
        let reply = resp.into_reply().unwrap();
        let call = reply.parts[0].as_function_call().unwrap();
        assert_eq!(call.name, "read_file");
        assert!(call.args.is_empty());
        assert!(call.args_error.as_deref().unwrap().starts_with("malformed JSON"));
    }

    #[test]
    fn test_response_non_object_arguments_are_flagged() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "id": "x",
                        "function": { "name": "write_file", "arguments": "[1, 2]" }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();
        let reply = resp.into_reply().unwrap();
        let call = reply.parts[0].as_function_call().unwrap();
        assert_eq!(
            call.args_error.as_deref(),
            Some("expected a JSON object, got [1,2]")
        );
    }

    #[test]
    fn test_response_text_only() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-abc",
            "choices": [{
                "message": { "content": "Hello!", "tool_calls": null },
                "finish_reason": "stop"
            }],
            "usage": null
        }))
        .unwrap();
        let reply = resp.into_reply().unwrap();
        assert!(!reply.has_tool_calls());
        assert_eq!(reply.parts, vec![Part::text("Hello!")]);
    }

    #[test]
    fn test_response_empty_choices_is_error() {
        let resp: ChatCompletionResponse =
            serde_json::from_value(json!({"id": "x", "choices": [], "usage": null})).unwrap();
        let err = resp.into_reply().unwrap_err();
        assert!(err.to_string().contains("No choices"));
    }

    #[test]
    fn test_request_omits_none_fields() {
        let request = ChatCompletionRequest {
            model: "gemini-2.0-flash-001".to_string(),
            messages: vec![Message::User {
                content: "Hello".into(),
            }],
            tools: None,
            tool_choice: None,
            max_tokens: Some(1024),
            temperature: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
    }
}
