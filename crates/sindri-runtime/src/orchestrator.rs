//! Orchestrator (C10, spec §4.10): the top-level driver that dispatches
//! the Scheduler's eligible Tasks through the Iteration Loop until the
//! root Task (and everything it spawned) reaches a terminal state.

use std::sync::Arc;

use uuid::Uuid;

use sindri_agents::AgentRegistry;
use sindri_domain::error::{Error, Result};
use sindri_domain::model::{Event, Task, TaskStatus};
use sindri_events::EventBus;
use sindri_models::ModelManager;

use crate::loop_::{IterationLoop, LoopReason};
use crate::scheduler::Scheduler;

/// Outcome of an `Orchestrator::run` call — the root Task's terminal
/// state once the Scheduler runs dry.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub success: bool,
    pub task_id: Uuid,
    pub subtasks: Vec<Uuid>,
    pub result: Option<String>,
    pub error: Option<String>,
}

/// Drives a user task to completion: creates the root Task for the
/// dispatcher agent, then repeatedly pulls the next eligible Task off the
/// shared `Scheduler` and runs it through the `IterationLoop`, handling
/// completion, delegation, and failure per spec §4.10.
pub struct Orchestrator {
    scheduler: Arc<Scheduler>,
    agents: AgentRegistry,
    loop_: IterationLoop,
    models: Arc<ModelManager>,
    events: Arc<EventBus>,
}

impl Orchestrator {
    pub fn new(
        scheduler: Arc<Scheduler>,
        agents: AgentRegistry,
        loop_: IterationLoop,
        models: Arc<ModelManager>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            scheduler,
            agents,
            loop_,
            models,
            events,
        }
    }

    /// Run `user_task` under `dispatcher_agent` (ordinarily `"brokkr"`)
    /// until it, and everything it delegates, resolves.
    pub async fn run(&self, user_task: impl Into<String>, dispatcher_agent: &str) -> Result<RunOutcome> {
        let root = Task::new(user_task.into(), dispatcher_agent.to_string());
        let root_id = self.scheduler.add_task(root);

        loop {
            let Some(next) = self.scheduler.next_eligible() else {
                if !self.scheduler.has_work() {
                    break;
                }
                // Tasks exist but none are eligible and none are Running:
                // either a dependency cycle or every task is Waiting on a
                // child that itself never got scheduled. Either way the
                // Scheduler cannot make progress on its own.
                return Err(Error::Other("scheduler stuck: no eligible task and nothing running".into()));
            };

            self.dispatch(next).await?;
        }

        self.collect_outcome(root_id)
    }

    #[tracing::instrument(skip(self, task), fields(task_id = %task.id, agent = %task.assigned_agent))]
    async fn dispatch(&self, task: Task) -> Result<()> {
        let task_id = task.id;
        let agent = self.agents.get(&task.assigned_agent)?.clone();

        self.scheduler.set_status(task_id, TaskStatus::Planning)?;
        self.scheduler.set_status(task_id, TaskStatus::Running)?;

        self.models.acquire(
            &self.events,
            &agent.model,
            agent.estimated_vram_gb,
            agent.fallback_model.as_deref(),
            agent.fallback_vram_gb,
        )?;

        let outcome = self.loop_.run(task_id, &agent).await;

        match outcome {
            Ok(result) if result.success => {
                tracing::info!(%task_id, "task complete");
                self.scheduler.update_task(task_id, |t| t.result = result.final_output.clone())?;
                self.scheduler.set_status(task_id, TaskStatus::Complete)?;
                self.events.publish(Event::TaskComplete {
                    task_id,
                    result: result.final_output.clone().unwrap_or_default(),
                });
                self.resolve_parent(task_id, result.final_output.unwrap_or_default(), "completed")?;
            }
            Ok(result) if result.reason == LoopReason::Delegated => {
                // The Loop already registered the child task, added it to
                // this task's `child_ids`, and transitioned this task to
                // Waiting itself (spec §4.8 step 4) — nothing left to do.
            }
            Ok(result) => {
                let reason = match result.reason {
                    LoopReason::MaxIterations => "max_iterations_reached",
                    LoopReason::Stuck => "stuck",
                    LoopReason::CompletionMarker | LoopReason::Delegated => unreachable!(),
                };
                self.fail_task(task_id, reason.to_string())?;
            }
            Err(e) => {
                self.fail_task(task_id, e.to_string())?;
            }
        }

        Ok(())
    }

    /// A child Task's failure is NOT cascaded to its parent's status
    /// directly — spec §4.10 step 2 says the failure "propagates as
    /// above", i.e. the same way a completion does: a synthetic turn
    /// recording the outcome, then the parent re-queued Pending so its
    /// own agent observes the failure and decides how to react (retry,
    /// report its own failure, try a different approach).
    fn fail_task(&self, task_id: Uuid, reason: String) -> Result<()> {
        tracing::error!(%task_id, %reason, "task failed");
        self.scheduler.update_task(task_id, |t| t.error = Some(reason.clone()))?;
        self.scheduler.set_status(task_id, TaskStatus::Failed)?;
        self.events.publish(Event::TaskFailed { task_id, reason: reason.clone() });
        self.resolve_parent(task_id, reason, "failed")
    }

    /// When a child Task resolves (successfully or not), record its
    /// outcome as a new `user` turn on the parent's session and re-queue
    /// the parent (spec §4.10, "session resumption protocol").
    fn resolve_parent(&self, child_id: Uuid, excerpt: String, status: &str) -> Result<()> {
        let Some(child) = self.scheduler.get_task(child_id) else {
            return Ok(());
        };
        let Some(parent_id) = child.parent_id else {
            return Ok(());
        };

        self.events.publish(Event::DelegationResolved { parent_id, child_id });

        let excerpt: String = excerpt.chars().take(400).collect();
        let note = format!("[child {} {status}: {excerpt}]", child.assigned_agent);

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("child_id".to_string(), serde_json::json!(child_id));
        metadata.insert("agent".to_string(), serde_json::json!(child.assigned_agent));
        metadata.insert("status".to_string(), serde_json::json!(status));

        if let Some(parent) = self.scheduler.get_task(parent_id) {
            if let Some(session_id) = parent.session_id {
                // The parent's session store lives behind the Loop; reach
                // it through the same handle the Loop itself uses so the
                // turn lands before the parent's next context build.
                self.loop_.append_child_outcome(session_id, &note, metadata)?;
            }
        }

        self.scheduler.set_status(parent_id, TaskStatus::Pending)
    }

    fn collect_outcome(&self, root_id: Uuid) -> Result<RunOutcome> {
        let root = self
            .scheduler
            .get_task(root_id)
            .ok_or_else(|| Error::Other(format!("root task {root_id} vanished")))?;
        let subtasks = self.collect_subtasks(root_id);
        Ok(RunOutcome {
            success: root.status == TaskStatus::Complete,
            task_id: root_id,
            subtasks,
            result: root.result,
            error: root.error,
        })
    }

    fn collect_subtasks(&self, task_id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        if let Some(task) = self.scheduler.get_task(task_id) {
            for child_id in task.child_ids {
                out.push(child_id);
                out.extend(self.collect_subtasks(child_id));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_subtasks_walks_the_whole_tree_depth_first() {
        let events = Arc::new(EventBus::new());
        let scheduler = Arc::new(Scheduler::new(events));
        let root = Task::new("root", "brokkr");
        let root_id = scheduler.add_task(root);
        let child = Task::child("child", "huginn", root_id);
        let child_id = scheduler.add_task(child);
        scheduler.update_task(root_id, |t| t.child_ids.push(child_id)).unwrap();
        let grandchild = Task::child("grandchild", "mimir", child_id);
        let grandchild_id = scheduler.add_task(grandchild);
        scheduler.update_task(child_id, |t| t.child_ids.push(grandchild_id)).unwrap();

        // Build a throwaway Orchestrator just to exercise the tree walk;
        // every other field is unused by `collect_subtasks`.
        let agents = AgentRegistry::empty();
        let tmp = tempfile::tempdir().unwrap();
        let model = Arc::new(sindri_llm::ModelClient::new(&sindri_domain::config::LlmConfig::default()).unwrap());
        let tools = Arc::new(sindri_tools::ToolRegistry::new(tmp.path()));
        let sessions = Arc::new(sindri_sessions::SessionStore::open_in_memory().unwrap());
        let checkpoints = Arc::new(sindri_sessions::CheckpointStore::new(tmp.path()).unwrap());
        let events = Arc::new(EventBus::new());
        let loop_ = IterationLoop::new(
            model,
            tools,
            sessions,
            checkpoints,
            events.clone(),
            scheduler.clone(),
            sindri_domain::config::ContextConfig::default(),
            sindri_domain::config::LoopConfig::default(),
        );
        let models = Arc::new(ModelManager::new(sindri_domain::config::VramConfig::default()));
        let orch = Orchestrator::new(scheduler.clone(), agents, loop_, models, events);

        let subtasks = orch.collect_subtasks(root_id);
        assert_eq!(subtasks, vec![child_id, grandchild_id]);
    }
}
