//! Iteration Loop (C8, spec §4.8): the per-Task execution cycle — build
//! context, call the model, extract and run tool calls, detect completion,
//! stuck agents, and delegation, checkpointing periodically.

use std::collections::VecDeque;
use std::sync::Arc;

use uuid::Uuid;

use sindri_agents::AgentDefinition;
use sindri_context::{ContextBuilder, OptionalSections};
use sindri_domain::config::{ContextConfig, LoopConfig};
use sindri_domain::error::{Error, Result};
use sindri_domain::model::{Event, SessionStatus, Turn, TurnRole};
use sindri_domain::tool::ToolDefinition;
use sindri_events::EventBus;
use sindri_llm::ModelClient;
use sindri_parser::{ParsedToolCall, ToolCallParser};
use sindri_sessions::{CheckpointStore, SessionStore};
use sindri_tools::ToolRegistry;

use crate::delegation::DelegateRequest;
use crate::scheduler::Scheduler;

/// Why a call to `IterationLoop::run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopReason {
    CompletionMarker,
    Delegated,
    MaxIterations,
    Stuck,
}

/// Outcome of one `IterationLoop::run` call — one Task's run until it
/// either finishes, suspends on delegation, or hits a hard limit.
#[derive(Debug, Clone)]
pub struct LoopResult {
    pub success: bool,
    pub iterations: u32,
    pub reason: LoopReason,
    pub final_output: Option<String>,
}

/// Drives one Task through its model-call / tool-call / completion-check
/// cycle. Shared across every Task the Orchestrator dispatches — all the
/// resources it holds (scheduler, registries, stores) are themselves
/// shared singletons (spec §5: "all Tasks share one Scheduler, one Event
/// Bus, one Session Store, one Tool Registry, one Model Manager").
///
/// Child tasks created on delegation are registered directly against the
/// shared `Scheduler` rather than through a separate orchestration handle
/// — there is exactly one Scheduler instance for the whole runtime, so
/// routing through another layer would only add indirection.
pub struct IterationLoop {
    model: Arc<ModelClient>,
    tools: Arc<ToolRegistry>,
    sessions: Arc<SessionStore>,
    checkpoints: Arc<CheckpointStore>,
    events: Arc<EventBus>,
    scheduler: Arc<Scheduler>,
    context_config: ContextConfig,
    loop_config: LoopConfig,
}

impl IterationLoop {
    pub fn new(
        model: Arc<ModelClient>,
        tools: Arc<ToolRegistry>,
        sessions: Arc<SessionStore>,
        checkpoints: Arc<CheckpointStore>,
        events: Arc<EventBus>,
        scheduler: Arc<Scheduler>,
        context_config: ContextConfig,
        loop_config: LoopConfig,
    ) -> Self {
        Self {
            model,
            tools,
            sessions,
            checkpoints,
            events,
            scheduler,
            context_config,
            loop_config,
        }
    }

    /// Run `task_id` against `agent` until it completes, suspends on
    /// delegation, gets stuck, or exhausts its iteration budget (spec
    /// §4.8, the nine numbered steps in order).
    #[tracing::instrument(skip(self, agent), fields(agent = %agent.name))]
    pub async fn run(&self, task_id: Uuid, agent: &AgentDefinition) -> Result<LoopResult> {
        let task = self
            .scheduler
            .get_task(task_id)
            .ok_or_else(|| Error::Other(format!("no such task: {task_id}")))?;

        let session_id = match task.session_id {
            Some(id) => id,
            None => {
                let session = self.sessions.create_session(&task.description, &agent.model)?;
                let id = session.id;
                self.scheduler.update_task(task_id, |t| t.session_id = Some(id))?;
                id
            }
        };

        let max_iterations = self.loop_config.max_iterations.min(agent.max_iterations);
        let tool_defs = tool_definitions(&self.tools, &agent.tools);

        let mut stuck_window: VecDeque<String> =
            VecDeque::with_capacity(self.loop_config.stuck_threshold as usize);
        let mut nudges_used = 0u32;
        let mut iteration = 0u32;

        loop {
            if iteration >= max_iterations {
                tracing::warn!(%task_id, max_iterations, "iteration cap reached");
                return Ok(LoopResult {
                    success: false,
                    iterations: iteration,
                    reason: LoopReason::MaxIterations,
                    final_output: None,
                });
            }
            iteration += 1;

            self.events.publish(Event::AgentIterationStarted {
                task_id,
                agent: agent.name.clone(),
                iteration,
            });

            // Step 1: build context from the agent's system prompt and the
            // session's accumulated turns. No memory-system injections are
            // wired up at this layer yet, so every `OptionalSections`
            // field is left unset.
            let session = self.sessions.load_session(session_id)?;
            let (messages, _report) = ContextBuilder::new(&self.context_config).build(
                &agent.system_prompt,
                &task.description,
                &OptionalSections::default(),
                &session.turns,
            );

            // Step 2: call the model. Non-streaming — this layer has no
            // display sink to feed token deltas to.
            let response = self.model.chat(&agent.model, &messages, &tool_defs).await?;
            self.events.publish(Event::AgentResponseComplete {
                task_id,
                content: response.content.clone(),
            });

            // Step 3: extract thinking, then native or parsed tool calls.
            let (reasoning, content) = ToolCallParser::extract_thinking(&response.content);
            if let Some(reasoning) = reasoning {
                tracing::debug!(task_id = %task_id, %reasoning, "agent reasoning");
            }

            let tool_calls: Vec<ParsedToolCall> = if !response.tool_calls.is_empty() {
                response
                    .tool_calls
                    .iter()
                    .map(|c| ParsedToolCall {
                        name: c.tool_name.clone(),
                        arguments: c.arguments.clone(),
                    })
                    .collect()
            } else {
                ToolCallParser::parse(&content)
            };

            // Step 4: execute tool calls. A `delegate` call suspends the
            // task instead of running inline.
            let executed = self.execute_tool_calls(task_id, &tool_calls).await;

            // This iteration's model call and tool executions are done
            // regardless of which path it takes from here (delegate,
            // completion, or an ordinary continuation), so the persisted
            // `iterations` count (spec §3) advances here once.
            self.sessions.bump_iteration(session_id)?;

            if let Some(delegate) = executed
                .iter()
                .find_map(|(_, result)| result.metadata.as_ref().and_then(DelegateRequest::from_metadata))
            {
                let assistant_turn = Turn::new(TurnRole::Assistant, content.clone())
                    .with_tool_calls(to_domain_tool_calls(&tool_calls));
                self.sessions.append_turn(session_id, &assistant_turn)?;
                for (_, result) in &executed {
                    self.sessions
                        .append_turn(session_id, &Turn::new(TurnRole::Tool, result.to_turn_text()))?;
                }

                let delegate_agent = delegate.agent.clone();
                let child = delegate.into_child_task(task_id);
                let child_id = self.scheduler.add_task(child);
                self.scheduler
                    .update_task(task_id, |t| t.child_ids.push(child_id))?;
                self.scheduler
                    .set_status(task_id, sindri_domain::model::TaskStatus::Waiting)?;
                self.events.publish(Event::DelegationStarted {
                    parent_id: task_id,
                    child_id,
                    agent: delegate_agent.clone(),
                });
                tracing::info!(%task_id, %child_id, agent = %delegate_agent, "delegating to child task");

                return Ok(LoopResult {
                    success: false,
                    iterations: iteration,
                    reason: LoopReason::Delegated,
                    final_output: None,
                });
            }

            // Step 5: completion check, before the turn is appended, and
            // only honored when no tools ran this iteration — a marker
            // alongside tool calls is ignored so the agent sees the
            // results and completes (or doesn't) on a later iteration.
            let marker_present =
                ToolCallParser::has_completion_marker(&content, &self.loop_config.completion_marker);
            if marker_present && executed.is_empty() {
                self.sessions
                    .complete_session(session_id, SessionStatus::Completed)?;
                tracing::info!(%task_id, iteration, "completion marker observed");
                return Ok(LoopResult {
                    success: true,
                    iterations: iteration,
                    reason: LoopReason::CompletionMarker,
                    final_output: Some(content),
                });
            }

            // Step 6: append the assistant turn and one tool turn per
            // executed call (ordinary, non-delegate calls).
            let assistant_turn = Turn::new(TurnRole::Assistant, content.clone())
                .with_tool_calls(to_domain_tool_calls(&tool_calls));
            self.sessions.append_turn(session_id, &assistant_turn)?;
            for (_, result) in &executed {
                self.sessions
                    .append_turn(session_id, &Turn::new(TurnRole::Tool, result.to_turn_text()))?;
            }

            // Step 7: stuck detection over a sliding window of assistant
            // content.
            if stuck_window.len() == self.loop_config.stuck_threshold as usize {
                stuck_window.pop_front();
            }
            stuck_window.push_back(content.clone());
            let is_stuck = stuck_window.len() == self.loop_config.stuck_threshold as usize
                && stuck_window.iter().all(|c| c == &content);
            if is_stuck {
                stuck_window.clear();
                nudges_used += 1;
                tracing::warn!(%task_id, nudges_used, "agent appears stuck, nudging");
                if nudges_used > self.loop_config.max_nudges {
                    tracing::error!(%task_id, nudges_used, "agent still stuck after max nudges");
                    return Err(Error::StuckAgent { nudges: nudges_used });
                }
                self.sessions.append_turn(
                    session_id,
                    &Turn::new(
                        TurnRole::User,
                        "You appear to be repeating yourself. Try a different approach or call the tool you need.",
                    ),
                )?;
            } else {
                // Spec §11.2: the nudge counter resets on any iteration
                // that produces genuinely new content, not just when the
                // window fires — otherwise a single stuck spell early on
                // would eat into the budget for an unrelated one later.
                nudges_used = 0;
            }

            // Step 8: checkpoint every `checkpoint_interval` iterations.
            if iteration % self.loop_config.checkpoint_interval == 0 {
                let refreshed = self.sessions.load_session(session_id)?;
                let recent_turns: Vec<Turn> =
                    refreshed.turns.iter().rev().take(10).rev().cloned().collect();
                let saved = self.checkpoints.save_checkpoint(
                    session_id,
                    sindri_domain::model::CheckpointState {
                        task: task.description.clone(),
                        iteration,
                        agent: agent.name.clone(),
                        recent_turns,
                    },
                );
                if saved {
                    self.events
                        .publish(Event::SessionCheckpointSaved { session_id, iteration });
                }
            }
        }
    }

    /// Append a synthetic `user` turn recording a child Task's outcome to
    /// its parent's session (spec §4.10, §12 open-question decision #3):
    /// textual excerpt as `content`, structured child id/agent/status in
    /// `metadata` alongside it.
    pub fn append_child_outcome(
        &self,
        parent_session_id: Uuid,
        excerpt: &str,
        metadata: std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        let turn = Turn::new(TurnRole::User, excerpt).with_metadata(metadata);
        self.sessions.append_turn(parent_session_id, &turn)
    }

    /// Execute every parsed call against the Tool Registry concurrently
    /// (spec §12 decision #1), buffering results and returning them in
    /// parsed order regardless of completion order so turn-append order
    /// stays the contract §5 fixes.
    async fn execute_tool_calls(
        &self,
        task_id: Uuid,
        calls: &[ParsedToolCall],
    ) -> Vec<(ParsedToolCall, sindri_domain::model::ToolResult)> {
        for call in calls {
            self.events.publish(Event::ToolCallStarted {
                task_id,
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            });
        }

        let futures = calls.iter().map(|call| {
            let tools = self.tools.clone();
            let name = call.name.clone();
            let arguments = call.arguments.clone();
            async move { tools.execute(&name, arguments).await }
        });
        let results = futures_util::future::join_all(futures).await;

        calls
            .iter()
            .cloned()
            .zip(results)
            .map(|(call, result)| {
                self.events.publish(Event::ToolCallComplete {
                    task_id,
                    name: call.name.clone(),
                    result: result.to_turn_text(),
                    success: result.success,
                });
                (call, result)
            })
            .collect()
    }
}

fn tool_definitions(registry: &ToolRegistry, allowed: &[String]) -> Vec<ToolDefinition> {
    registry
        .get_schemas(allowed)
        .into_iter()
        .map(|s| ToolDefinition {
            name: s.name,
            description: s.description,
            parameters: s.parameters,
        })
        .collect()
}

fn to_domain_tool_calls(calls: &[ParsedToolCall]) -> Vec<sindri_domain::tool::ToolCall> {
    calls
        .iter()
        .map(|c| sindri_domain::tool::ToolCall {
            call_id: Uuid::new_v4().to_string(),
            tool_name: c.name.clone(),
            arguments: c.arguments.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use sindri_domain::config::LlmConfig;
    use sindri_domain::model::Task;

    fn agent() -> AgentDefinition {
        AgentDefinition {
            name: "huginn".into(),
            role: "implementer".into(),
            model: "qwen2.5-coder:14b".into(),
            estimated_vram_gb: 10.0,
            fallback_model: None,
            fallback_vram_gb: None,
            system_prompt: "You are Huginn. {task}".into(),
            tools: vec!["read_file".into()],
            can_delegate: false,
            delegate_to: vec![],
            max_iterations: 5,
            temperature: 0.3,
            priority: 1,
        }
    }

    fn make_loop(tmp: &tempfile::TempDir) -> (IterationLoop, Arc<Scheduler>) {
        let events = Arc::new(EventBus::new());
        let scheduler = Arc::new(Scheduler::new(events.clone()));
        let sessions = Arc::new(SessionStore::open_in_memory().unwrap());
        let checkpoints = Arc::new(CheckpointStore::new(tmp.path()).unwrap());
        let model = Arc::new(ModelClient::new(&LlmConfig::default()).unwrap());
        let tools = Arc::new(ToolRegistry::new(tmp.path()));
        let loop_ = IterationLoop::new(
            model,
            tools,
            sessions,
            checkpoints,
            events,
            scheduler.clone(),
            ContextConfig::default(),
            LoopConfig {
                max_iterations: 3,
                ..LoopConfig::default()
            },
        );
        (loop_, scheduler)
    }

    #[test]
    fn tool_definitions_filters_to_allowed_subset() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::new(tmp.path());
        let defs = tool_definitions(&registry, &["read_file".to_string()]);
        assert!(defs.is_empty());
    }

    #[tokio::test]
    async fn run_creates_a_session_on_first_dispatch() {
        let tmp = tempfile::tempdir().unwrap();
        let (loop_, scheduler) = make_loop(&tmp);
        let task = Task::new("say hi", "huginn");
        let task_id = scheduler.add_task(task);
        scheduler
            .set_status(task_id, sindri_domain::model::TaskStatus::Planning)
            .unwrap();
        scheduler
            .set_status(task_id, sindri_domain::model::TaskStatus::Running)
            .unwrap();

        // The model call itself will fail (no runtime listening), but the
        // session should already be created and attached to the task by
        // the time that happens.
        let _ = loop_.run(task_id, &agent()).await;
        let refreshed = scheduler.get_task(task_id).unwrap();
        assert!(refreshed.session_id.is_some());
    }

    #[tokio::test]
    async fn run_fails_fast_when_task_does_not_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let (loop_, _scheduler) = make_loop(&tmp);
        let result = loop_.run(Uuid::new_v4(), &agent()).await;
        assert!(result.is_err());
    }
}
