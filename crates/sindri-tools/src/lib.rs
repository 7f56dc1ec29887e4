//! Built-in tools for the Sindri runtime.
//!
//! Implements the exec/process tool pair, the workspace file-operation
//! tools, and the special `delegate` tool, all exposed through the `Tool`
//! trait and `ToolRegistry` defined in `registry`.

pub mod delegate;
pub mod exec;
pub mod exec_tool;
pub mod file_ops;
pub mod file_tools;
pub mod manager;
pub mod process;
pub mod process_tool;
pub mod registry;

pub use manager::ProcessManager;
pub use registry::{Tool, ToolRegistry, ToolSchema};

use std::path::Path;
use std::sync::Arc;

/// Build a `ToolRegistry` pre-populated with every built-in tool, rooted at
/// `workspace_root` for file operations and sharing `manager` for exec's
/// background sessions.
pub fn default_registry(
    workspace_root: impl AsRef<Path>,
    manager: Arc<ProcessManager>,
) -> ToolRegistry {
    let workspace_root = workspace_root.as_ref().to_path_buf();
    ToolRegistry::new(workspace_root.clone())
        .with(Arc::new(file_tools::ReadFileTool {
            workspace_root: workspace_root.clone(),
        }))
        .with(Arc::new(file_tools::WriteFileTool {
            workspace_root: workspace_root.clone(),
        }))
        .with(Arc::new(file_tools::AppendFileTool {
            workspace_root: workspace_root.clone(),
        }))
        .with(Arc::new(file_tools::MoveFileTool {
            workspace_root: workspace_root.clone(),
        }))
        .with(Arc::new(file_tools::DeleteFileTool {
            workspace_root: workspace_root.clone(),
        }))
        .with(Arc::new(file_tools::ListFilesTool { workspace_root }))
        .with(Arc::new(exec_tool::ExecTool {
            manager: manager.clone(),
        }))
        .with(Arc::new(process_tool::ProcessTool { manager }))
        .with(Arc::new(delegate::DelegateTool))
}
