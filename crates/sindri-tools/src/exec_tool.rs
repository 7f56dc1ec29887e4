//! `Tool` wrapper around `exec::exec`, backed by a shared `ProcessManager`
//! so background sessions started by one call remain visible to `process`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sindri_domain::model::ToolResult;

use crate::exec::{self, ExecRequest};
use crate::manager::ProcessManager;
use crate::registry::Tool;

pub struct ExecTool {
    pub manager: Arc<ProcessManager>,
}

#[async_trait]
impl Tool for ExecTool {
    fn name(&self) -> &str {
        "exec"
    }

    fn description(&self) -> &str {
        "Run a shell command. Long-running commands auto-background after \
         yield_ms and return a session_id for polling via the process tool."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {"type": "string"},
                "background": {"type": "boolean"},
                "yield_ms": {"type": "integer"},
                "timeout_sec": {"type": "integer"},
                "workdir": {"type": "string"},
                "env": {"type": "object", "additionalProperties": {"type": "string"}}
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        let req: ExecRequest = match serde_json::from_value(arguments) {
            Ok(req) => req,
            Err(e) => return ToolResult::err(format!("invalid arguments: {e}")),
        };
        let response = exec::exec(&self.manager, req).await;
        let success = !matches!(response.status, crate::manager::ProcessStatus::Failed);
        let output = serde_json::to_string(&response).unwrap_or_default();
        if success {
            ToolResult::ok(output)
        } else {
            ToolResult::err(output)
        }
    }
}
