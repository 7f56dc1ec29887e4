//! `Tool` wrapper around `process::handle_process`, exposing the background
//! process manager's list/poll/log/write/kill/clear/remove actions.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sindri_domain::model::ToolResult;

use crate::manager::ProcessManager;
use crate::process::{self, ProcessRequest};
use crate::registry::Tool;

pub struct ProcessTool {
    pub manager: Arc<ProcessManager>,
}

#[async_trait]
impl Tool for ProcessTool {
    fn name(&self) -> &str {
        "process"
    }

    fn description(&self) -> &str {
        "Inspect or control a background process session started by exec: \
         list, poll, log, write, kill, clear, remove."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {"type": "string", "enum": ["list", "poll", "log", "write", "kill", "clear", "remove"]},
                "session_id": {"type": "string"},
                "offset": {"type": "integer"},
                "limit": {"type": "integer"},
                "tail_lines": {"type": "integer"},
                "data": {"type": "string"},
                "eof": {"type": "boolean"}
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        let req: ProcessRequest = match serde_json::from_value(arguments) {
            Ok(req) => req,
            Err(e) => return ToolResult::err(format!("invalid arguments: {e}")),
        };
        let response = process::handle_process(&self.manager, req).await;
        let success = response.success;
        let output = serde_json::to_string(&response).unwrap_or_default();
        if success {
            ToolResult::ok(output)
        } else {
            ToolResult::err(response.error.unwrap_or(output))
        }
    }
}
