//! Wire types for the local model runtime's chat endpoint (`/api/chat`),
//! and the conversions between them and the domain-level message/tool types.

use serde::{Deserialize, Serialize};
use sindri_domain::tool::{Message, Role, ToolCall, ToolDefinition};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequestBody {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireToolDefinition>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunction,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseChunk {
    pub model: String,
    #[serde(default)]
    pub message: Option<WireResponseMessage>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponseMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireToolCall {
    pub function: WireToolCallFunction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireToolCallFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

pub(crate) fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|m| WireMessage {
            role: role_str(m.role),
            content: m.content.extract_all_text(),
        })
        .collect()
}

pub(crate) fn to_wire_tools(tools: &[ToolDefinition]) -> Vec<WireToolDefinition> {
    tools
        .iter()
        .map(|t| WireToolDefinition {
            kind: "function",
            function: WireFunction {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            },
        })
        .collect()
}

/// The runtime never assigns an id of its own to a tool call, so the client
/// synthesizes one — the parser (`sindri-parser`) does the same for calls it
/// recovers from free text, keeping `ToolCall::call_id` always populated.
pub(crate) fn from_wire_tool_calls(calls: Vec<WireToolCall>) -> Vec<ToolCall> {
    calls
        .into_iter()
        .map(|c| ToolCall {
            call_id: Uuid::new_v4().to_string(),
            tool_name: c.function.name,
            arguments: c.function.arguments,
        })
        .collect()
}
