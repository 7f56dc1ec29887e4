//! Tool Registry & Tool Contract (spec §4.2).
//!
//! A `Tool` describes itself with a JSON-Schema parameter set and executes
//! asynchronously, returning a `ToolResult` rather than propagating most
//! failures as `Err` — only `ToolUnknown`/`ToolInvalidArgs` surface as
//! `sindri_domain::Error` from the registry itself; a tool's own internal
//! failure is folded into `ToolResult{success: false}` by `execute`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sindri_domain::error::{Error, Result};
use sindri_domain::model::ToolResult;

/// A single tool's name, description, and JSON-Schema parameter set — the
/// JSON-RPC-style function descriptor shape the Model Client sends upstream.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSchema {
    /// The `{type: "function", function: {...}}` wire shape (spec §6).
    pub fn as_function_descriptor(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Value;
    /// Execute the tool. Implementations must be safe to call concurrently
    /// with distinct argument objects.
    async fn execute(&self, arguments: Value) -> ToolResult;

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Holds named tools; the registry is constructed with a working directory
/// that file-operation tools resolve relative paths against.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    workspace_root: PathBuf,
}

impl ToolRegistry {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            tools: HashMap::new(),
            workspace_root: workspace_root.into(),
        }
    }

    pub fn workspace_root(&self) -> &PathBuf {
        &self.workspace_root
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Schemas for the given subset of tool names. Unknown names are
    /// silently skipped — callers are expected to pass an agent's
    /// already-validated tool set.
    pub fn get_schemas(&self, subset: &[String]) -> Vec<ToolSchema> {
        subset
            .iter()
            .filter_map(|name| self.tools.get(name).map(|t| t.schema()))
            .collect()
    }

    pub fn all_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    pub async fn execute(&self, name: &str, arguments: Value) -> ToolResult {
        match self.tools.get(name) {
            Some(tool) => tool.execute(arguments).await,
            None => ToolResult::err(format!("unknown tool: {name}")),
        }
    }

    /// Like `execute`, but returns a typed error for unknown tool names
    /// instead of folding it into a `ToolResult` — used by callers that
    /// need to distinguish "tool doesn't exist" from "tool ran and failed".
    pub fn execute_checked(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ToolUnknown(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn parameters(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
        async fn execute(&self, arguments: Value) -> ToolResult {
            ToolResult::ok(arguments["text"].as_str().unwrap_or("").to_string())
        }
    }

    #[tokio::test]
    async fn registry_executes_known_tool() {
        let registry = ToolRegistry::new("/tmp").with(Arc::new(Echo));
        let result = registry.execute("echo", serde_json::json!({"text": "hi"})).await;
        assert!(result.success);
        assert_eq!(result.output, "hi");
    }

    #[tokio::test]
    async fn registry_unknown_tool_fails_gracefully() {
        let registry = ToolRegistry::new("/tmp");
        let result = registry.execute("nope", serde_json::json!({})).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("unknown tool"));
    }

    #[test]
    fn execute_checked_returns_typed_error() {
        let registry = ToolRegistry::new("/tmp");
        let err = registry.execute_checked("nope").unwrap_err();
        assert!(matches!(err, Error::ToolUnknown(_)));
    }

    #[test]
    fn schemas_filter_unknown_and_preserve_order() {
        let registry = ToolRegistry::new("/tmp").with(Arc::new(Echo));
        let schemas = registry.get_schemas(&["echo".to_string(), "ghost".to_string()]);
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name, "echo");
    }
}
