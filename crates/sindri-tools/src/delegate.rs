//! The `delegate` tool (spec §4.2, §4.8 step 4).
//!
//! Unlike every other tool, `execute` performs no work of its own. It
//! validates its arguments and packages them into `ToolResult::metadata` so
//! the Iteration Loop can recognize a delegate attempt, suspend the current
//! task, and hand the payload to the Orchestrator to spawn a child Task. The
//! loop keys off `metadata["kind"] == "delegate"` rather than the tool name,
//! so a differently-named tool could in principle trigger the same path.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sindri_domain::model::ToolResult;
use std::collections::HashMap;

use crate::registry::Tool;

#[derive(Debug, Deserialize)]
struct DelegateArgs {
    agent: String,
    task: String,
    #[serde(default)]
    context: Option<Value>,
}

pub struct DelegateTool;

#[async_trait]
impl Tool for DelegateTool {
    fn name(&self) -> &str {
        "delegate"
    }

    fn description(&self) -> &str {
        "Hand a sub-task off to another agent. Suspends the current task \
         until the child completes or fails."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "agent": {"type": "string"},
                "task": {"type": "string"},
                "context": {"type": "object"}
            },
            "required": ["agent", "task"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        let args: DelegateArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => return ToolResult::err(format!("invalid arguments: {e}")),
        };

        let mut metadata = HashMap::new();
        metadata.insert("kind".to_string(), Value::String("delegate".to_string()));
        metadata.insert("agent".to_string(), Value::String(args.agent.clone()));
        metadata.insert("task".to_string(), Value::String(args.task.clone()));
        if let Some(context) = args.context {
            metadata.insert("context".to_string(), context);
        }

        ToolResult::ok(format!("delegating to {}: {}", args.agent, args.task))
            .with_metadata(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delegate_packages_metadata() {
        let tool = DelegateTool;
        let result = tool
            .execute(serde_json::json!({"agent": "huginn", "task": "write a.txt"}))
            .await;
        assert!(result.success);
        let metadata = result.metadata.expect("metadata present");
        assert_eq!(metadata["kind"], Value::String("delegate".to_string()));
        assert_eq!(metadata["agent"], Value::String("huginn".to_string()));
    }

    #[tokio::test]
    async fn delegate_rejects_missing_fields() {
        let tool = DelegateTool;
        let result = tool.execute(serde_json::json!({"agent": "huginn"})).await;
        assert!(!result.success);
    }
}
