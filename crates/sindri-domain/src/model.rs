//! The core data model (spec §3): Task, Session, Turn, Checkpoint, Event.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::tool::ToolCall;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Task
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Planning,
    Waiting,
    Running,
    Complete,
    Failed,
    Blocked,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition per spec §4.9.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Planning)
                | (Pending, Running) // scheduler may dispatch straight to Running
                | (Planning, Running)
                | (Running, Waiting)
                | (Running, Complete)
                | (Running, Failed)
                | (Running, Blocked)
                | (Waiting, Pending)
        )
    }
}

/// A unit of work assigned to one agent; may spawn child Tasks via delegation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub assigned_agent: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub child_ids: Vec<Uuid>,
    #[serde(default)]
    pub session_id: Option<Uuid>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub dependencies: HashSet<Uuid>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub context: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    /// Monotonic counter assigned at insertion, used to break priority ties
    /// in FIFO order (earliest-created wins).
    #[serde(default)]
    pub sequence: u64,
}

impl Task {
    pub fn new(description: impl Into<String>, assigned_agent: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            assigned_agent: assigned_agent.into(),
            parent_id: None,
            child_ids: Vec::new(),
            session_id: None,
            status: TaskStatus::Pending,
            priority: 0,
            dependencies: HashSet::new(),
            result: None,
            error: None,
            context: HashMap::new(),
            created_at: Utc::now(),
            sequence: 0,
        }
    }

    pub fn child(
        description: impl Into<String>,
        assigned_agent: impl Into<String>,
        parent_id: Uuid,
    ) -> Self {
        let mut t = Self::new(description, assigned_agent);
        t.parent_id = Some(parent_id);
        t
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session / Turn
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    Tool,
    System,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::Tool => "tool",
            TurnRole::System => "system",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TurnRole {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            "tool" => Ok(TurnRole::Tool),
            "system" => Ok(TurnRole::System),
            other => Err(crate::error::Error::Other(format!(
                "unknown turn role: {other}"
            ))),
        }
    }
}

/// One message in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = calls;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The persistent record of one Task's execution: its ordered turn list and
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub task: String,
    pub model: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub iterations: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl Session {
    pub fn new(task: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
            model: model.into(),
            status: SessionStatus::Active,
            iterations: 0,
            created_at: Utc::now(),
            completed_at: None,
            turns: Vec::new(),
        }
    }
}

/// Lightweight projection of a `Session` for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub task: String,
    pub model: String,
    pub status: SessionStatus,
    pub iterations: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Checkpoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Opaque (to the Recovery Manager) loop state, sufficient to resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointState {
    pub task: String,
    pub iteration: u32,
    pub agent: String,
    /// Trailing slice of turns, enough to rebuild context on resume.
    pub recent_turns: Vec<Turn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub state: CheckpointState,
}

/// Summary returned by `list_recoverable_sessions`, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointSummary {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub task: String,
    pub agent: String,
    pub iteration: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ToolResult
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, Value>>,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
            metadata: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            output: String::new(),
            error: Some(message),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Canonical textual form stored in the `tool` turn that follows
    /// this call (spec §4.8 step 4/6).
    pub fn to_turn_text(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            format!(
                "error: {}",
                self.error.as_deref().unwrap_or("tool execution failed")
            )
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Event
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tagged variant covering every state transition the core must publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskCreated {
        task_id: Uuid,
        agent: String,
        parent_id: Option<Uuid>,
    },
    TaskStatusChanged {
        task_id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
    },
    AgentIterationStarted {
        task_id: Uuid,
        agent: String,
        iteration: u32,
    },
    AgentResponseStreaming {
        task_id: Uuid,
        token: String,
    },
    AgentResponseComplete {
        task_id: Uuid,
        content: String,
    },
    ToolCallStarted {
        task_id: Uuid,
        name: String,
        arguments: Value,
    },
    ToolCallComplete {
        task_id: Uuid,
        name: String,
        result: String,
        success: bool,
    },
    ModelLoadRequested {
        model_id: String,
    },
    ModelLoaded {
        model_id: String,
        estimated_gb: f64,
    },
    ModelEvicted {
        model_id: String,
    },
    ModelFallback {
        requested: String,
        fallback: String,
    },
    SessionCheckpointSaved {
        session_id: Uuid,
        iteration: u32,
    },
    DelegationStarted {
        parent_id: Uuid,
        child_id: Uuid,
        agent: String,
    },
    DelegationResolved {
        parent_id: Uuid,
        child_id: Uuid,
    },
    TaskComplete {
        task_id: Uuid,
        result: String,
    },
    TaskFailed {
        task_id: Uuid,
        reason: String,
    },
}

impl Event {
    /// Stable discriminant, used as the Event Bus subscription key.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TaskCreated { .. } => "task_created",
            Event::TaskStatusChanged { .. } => "task_status_changed",
            Event::AgentIterationStarted { .. } => "agent_iteration_started",
            Event::AgentResponseStreaming { .. } => "agent_response_streaming",
            Event::AgentResponseComplete { .. } => "agent_response_complete",
            Event::ToolCallStarted { .. } => "tool_call_started",
            Event::ToolCallComplete { .. } => "tool_call_complete",
            Event::ModelLoadRequested { .. } => "model_load_requested",
            Event::ModelLoaded { .. } => "model_loaded",
            Event::ModelEvicted { .. } => "model_evicted",
            Event::ModelFallback { .. } => "model_fallback",
            Event::SessionCheckpointSaved { .. } => "session_checkpoint_saved",
            Event::DelegationStarted { .. } => "delegation_started",
            Event::DelegationResolved { .. } => "delegation_resolved",
            Event::TaskComplete { .. } => "task_complete",
            Event::TaskFailed { .. } => "task_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_transitions() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Running));
        assert!(TaskStatus::Running.can_transition_to(TaskStatus::Waiting));
        assert!(TaskStatus::Waiting.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Complete.can_transition_to(TaskStatus::Running));
        assert!(!TaskStatus::Blocked.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn task_status_is_terminal() {
        assert!(TaskStatus::Complete.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Waiting.is_terminal());
        assert!(!TaskStatus::Blocked.is_terminal());
    }

    #[test]
    fn tool_result_turn_text() {
        let ok = ToolResult::ok("wrote 12 bytes");
        assert_eq!(ok.to_turn_text(), "wrote 12 bytes");

        let err = ToolResult::err("permission denied");
        assert_eq!(err.to_turn_text(), "error: permission denied");
    }

    #[test]
    fn event_kind_is_stable() {
        let ev = Event::TaskComplete {
            task_id: Uuid::nil(),
            result: "done".into(),
        };
        assert_eq!(ev.kind(), "task_complete");
    }
}
