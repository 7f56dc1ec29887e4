//! Delegation protocol glue (spec §4.8 step 4, §4.10): recognizing a
//! `delegate` tool call and turning it into a child `Task`.

use serde_json::Value;
use uuid::Uuid;

use sindri_domain::model::Task;

/// A parsed `delegate` call, extracted from a `ToolResult`'s metadata bag
/// (`sindri-tools`' `DelegateTool` always populates `kind == "delegate"`).
#[derive(Debug, Clone)]
pub struct DelegateRequest {
    pub agent: String,
    pub task: String,
    pub context: Option<Value>,
}

impl DelegateRequest {
    /// Recognize a delegate attempt from a tool result's metadata, keyed
    /// off `metadata["kind"] == "delegate"` rather than the tool's name
    /// (spec §4.2: a differently-named tool could in principle trigger
    /// the same path).
    pub fn from_metadata(metadata: &std::collections::HashMap<String, Value>) -> Option<Self> {
        if metadata.get("kind").and_then(Value::as_str) != Some("delegate") {
            return None;
        }
        let agent = metadata.get("agent")?.as_str()?.to_string();
        let task = metadata.get("task")?.as_str()?.to_string();
        let context = metadata.get("context").cloned();
        Some(Self { agent, task, context })
    }

    /// Build the child `Task` this delegation spawns, parented to
    /// `parent_id`.
    pub fn into_child_task(self, parent_id: Uuid) -> Task {
        let mut child = Task::child(self.task, self.agent, parent_id);
        if let Some(Value::Object(map)) = self.context {
            for (k, v) in map {
                child.context.insert(k, v);
            }
        }
        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_delegate_metadata() {
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("kind".to_string(), json!("delegate"));
        metadata.insert("agent".to_string(), json!("huginn"));
        metadata.insert("task".to_string(), json!("write a.txt"));
        let req = DelegateRequest::from_metadata(&metadata).unwrap();
        assert_eq!(req.agent, "huginn");
        assert_eq!(req.task, "write a.txt");
    }

    #[test]
    fn ignores_non_delegate_metadata() {
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("kind".to_string(), json!("something_else"));
        assert!(DelegateRequest::from_metadata(&metadata).is_none());
    }

    #[test]
    fn child_task_carries_parent_id_and_context() {
        let parent = Uuid::new_v4();
        let req = DelegateRequest {
            agent: "huginn".into(),
            task: "do it".into(),
            context: Some(json!({"hint": "use rust"})),
        };
        let child = req.into_child_task(parent);
        assert_eq!(child.parent_id, Some(parent));
        assert_eq!(child.assigned_agent, "huginn");
        assert_eq!(child.context.get("hint").unwrap(), &json!("use rust"));
    }
}
