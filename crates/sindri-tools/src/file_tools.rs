//! `Tool` wrappers around the free functions in `file_ops`, each resolving
//! paths against the registry's workspace root.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use sindri_domain::model::ToolResult;

use crate::file_ops;
use crate::registry::Tool;

fn to_tool_result(r: Result<Value, String>) -> ToolResult {
    match r {
        Ok(v) => ToolResult::ok(v.to_string()),
        Err(e) => ToolResult::err(e),
    }
}

pub struct ReadFileTool {
    pub workspace_root: PathBuf,
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }
    fn description(&self) -> &str {
        "Read a text file from the workspace, optionally by line range."
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "offset": {"type": "integer"},
                "limit": {"type": "integer"}
            },
            "required": ["path"]
        })
    }
    async fn execute(&self, arguments: Value) -> ToolResult {
        match serde_json::from_value(arguments) {
            Ok(req) => to_tool_result(file_ops::file_read(&self.workspace_root, req).await),
            Err(e) => ToolResult::err(format!("invalid arguments: {e}")),
        }
    }
}

pub struct WriteFileTool {
    pub workspace_root: PathBuf,
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }
    fn description(&self) -> &str {
        "Write (overwrite) a text file in the workspace, creating parent directories as needed."
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["path", "content"]
        })
    }
    async fn execute(&self, arguments: Value) -> ToolResult {
        match serde_json::from_value(arguments) {
            Ok(req) => to_tool_result(file_ops::file_write(&self.workspace_root, req).await),
            Err(e) => ToolResult::err(format!("invalid arguments: {e}")),
        }
    }
}

pub struct AppendFileTool {
    pub workspace_root: PathBuf,
}

#[async_trait]
impl Tool for AppendFileTool {
    fn name(&self) -> &str {
        "append_file"
    }
    fn description(&self) -> &str {
        "Append text to a file in the workspace, creating it if absent."
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["path", "content"]
        })
    }
    async fn execute(&self, arguments: Value) -> ToolResult {
        match serde_json::from_value(arguments) {
            Ok(req) => to_tool_result(file_ops::file_append(&self.workspace_root, req).await),
            Err(e) => ToolResult::err(format!("invalid arguments: {e}")),
        }
    }
}

pub struct MoveFileTool {
    pub workspace_root: PathBuf,
}

#[async_trait]
impl Tool for MoveFileTool {
    fn name(&self) -> &str {
        "move_file"
    }
    fn description(&self) -> &str {
        "Move or rename a file within the workspace."
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "source": {"type": "string"},
                "destination": {"type": "string"}
            },
            "required": ["source", "destination"]
        })
    }
    async fn execute(&self, arguments: Value) -> ToolResult {
        match serde_json::from_value(arguments) {
            Ok(req) => to_tool_result(file_ops::file_move(&self.workspace_root, req).await),
            Err(e) => ToolResult::err(format!("invalid arguments: {e}")),
        }
    }
}

pub struct DeleteFileTool {
    pub workspace_root: PathBuf,
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }
    fn description(&self) -> &str {
        "Delete a file in the workspace."
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "required": ["path"]
        })
    }
    async fn execute(&self, arguments: Value) -> ToolResult {
        match serde_json::from_value(arguments) {
            Ok(req) => to_tool_result(file_ops::file_delete(&self.workspace_root, req).await),
            Err(e) => ToolResult::err(format!("invalid arguments: {e}")),
        }
    }
}

pub struct ListFilesTool {
    pub workspace_root: PathBuf,
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }
    fn description(&self) -> &str {
        "List the contents of a directory in the workspace."
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {"path": {"type": "string"}}
        })
    }
    async fn execute(&self, arguments: Value) -> ToolResult {
        match serde_json::from_value(arguments) {
            Ok(req) => to_tool_result(file_ops::file_list(&self.workspace_root, req).await),
            Err(e) => ToolResult::err(format!("invalid arguments: {e}")),
        }
    }
}
