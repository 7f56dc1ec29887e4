//! Model Client (spec §4.1): single and token-streamed chat requests
//! against a local, Ollama-compatible model runtime.

use std::time::Duration;

use sindri_domain::config::LlmConfig;
use sindri_domain::error::{Error, Result};
use sindri_domain::tool::{Message, ToolCall, ToolDefinition};

use crate::ndjson::drain_lines;
use crate::wire::{
    from_wire_tool_calls, to_wire_messages, to_wire_tools, ChatRequestBody, ChatResponseChunk,
};

/// Accumulated result of a chat or chat-stream call.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub model: String,
    pub done: bool,
}

pub struct ModelClient {
    base_url: String,
    client: reqwest::Client,
}

impl ModelClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.default_timeout_ms))
            .build()
            .map_err(|e| Error::ModelUnavailable {
                model: config.default_model.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Send a chat request and wait for the full response (spec §4.1).
    ///
    /// No retry: a transport failure or non-2xx status surfaces immediately
    /// as `ModelUnavailable` and a malformed body as `ModelProtocolError`;
    /// the Loop and Orchestrator own any retry policy.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ChatResponse> {
        let body = ChatRequestBody {
            model: model.to_string(),
            messages: to_wire_messages(messages),
            tools: to_wire_tools(tools),
            stream: false,
            options: None,
        };

        let response = self.send_once(&body).await?;
        self.parse_full(model, response).await
    }

    /// Send a chat request in streaming mode, invoking `on_token` for every
    /// content delta. Returns the fully accumulated response once the
    /// runtime signals `done`.
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        mut on_token: impl FnMut(&str),
    ) -> Result<ChatResponse> {
        let body = ChatRequestBody {
            model: model.to_string(),
            messages: to_wire_messages(messages),
            tools: to_wire_tools(tools),
            stream: true,
            options: None,
        };

        let mut response = self.send_once(&body).await?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        let mut buffer = String::new();
        let mut seen_model = model.to_string();

        loop {
            let chunk = response.chunk().await.map_err(|e| Error::ModelUnavailable {
                model: model.to_string(),
                message: format!("stream read failed: {e}"),
            })?;
            let bytes = match chunk {
                Some(bytes) => bytes,
                None => break,
            };
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            for line in drain_lines(&mut buffer) {
                let parsed: ChatResponseChunk =
                    serde_json::from_str(&line).map_err(|e| Error::ModelProtocolError {
                        model: model.to_string(),
                        message: format!("invalid stream chunk: {e} (line: {line})"),
                    })?;
                seen_model = parsed.model.clone();
                if let Some(message) = parsed.message {
                    if !message.content.is_empty() {
                        on_token(&message.content);
                        content.push_str(&message.content);
                    }
                    if !message.tool_calls.is_empty() {
                        tool_calls = from_wire_tool_calls(message.tool_calls);
                    }
                }
                if parsed.done {
                    return Ok(ChatResponse {
                        content,
                        tool_calls,
                        model: seen_model,
                        done: true,
                    });
                }
            }
        }

        Ok(ChatResponse {
            content,
            tool_calls,
            model: seen_model,
            done: true,
        })
    }

    async fn send_once(&self, body: &ChatRequestBody) -> Result<reqwest::Response> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::ModelUnavailable {
                model: body.model.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::ModelUnavailable {
                model: body.model.clone(),
                message: format!("HTTP {status}: {text}"),
            });
        }

        Ok(response)
    }

    async fn parse_full(&self, model: &str, response: reqwest::Response) -> Result<ChatResponse> {
        let text = response.text().await.map_err(|e| Error::ModelUnavailable {
            model: model.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;
        let parsed: ChatResponseChunk =
            serde_json::from_str(&text).map_err(|e| Error::ModelProtocolError {
                model: model.to_string(),
                message: format!("invalid response body: {e}"),
            })?;
        let message = parsed
            .message
            .ok_or_else(|| Error::ModelProtocolError {
                model: model.to_string(),
                message: "response missing 'message' field".to_string(),
            })?;
        Ok(ChatResponse {
            content: message.content,
            tool_calls: from_wire_tool_calls(message.tool_calls),
            model: parsed.model,
            done: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_response_carries_accumulated_fields() {
        let response = ChatResponse {
            content: "hello".into(),
            tool_calls: vec![],
            model: "qwen2.5-coder:14b".into(),
            done: true,
        };
        assert_eq!(response.content, "hello");
        assert!(response.done);
    }

    #[test]
    fn client_rejects_empty_base_url_gracefully() {
        let mut cfg = LlmConfig::default();
        cfg.base_url = "not a url".into();
        // Building the client itself never fails on a malformed URL — only
        // the eventual request does — so this simply documents the
        // lenient-construction contract.
        let client = ModelClient::new(&cfg);
        assert!(client.is_ok());
    }
}
