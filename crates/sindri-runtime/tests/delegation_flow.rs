//! Integration test for the delegation + resume protocol (spec §8 scenario
//! 2) across the Scheduler and delegation glue, without a live model —
//! the parts of the flow that are pure data-structure bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use sindri_domain::model::{Task, TaskStatus};
use sindri_events::EventBus;
use sindri_runtime::{DelegateRequest, Scheduler};

fn delegate_metadata(agent: &str, task: &str) -> HashMap<String, serde_json::Value> {
    let mut metadata = HashMap::new();
    metadata.insert("kind".to_string(), json!("delegate"));
    metadata.insert("agent".to_string(), json!(agent));
    metadata.insert("task".to_string(), json!(task));
    metadata
}

#[test]
fn delegation_suspends_parent_and_schedules_child() {
    let scheduler = Scheduler::new(Arc::new(EventBus::new()));

    let parent = Task::new("implement two files", "brokkr");
    let parent_id = scheduler.add_task(parent);
    scheduler.set_status(parent_id, TaskStatus::Planning).unwrap();
    scheduler.set_status(parent_id, TaskStatus::Running).unwrap();

    // The model asked to delegate; the loop (outside this test) would
    // execute this sequence on recognizing the tool result's metadata.
    let metadata = delegate_metadata("huginn", "write a.txt='first'");
    let request = DelegateRequest::from_metadata(&metadata).expect("delegate recognized");
    let child = request.into_child_task(parent_id);
    let child_id = scheduler.add_task(child);
    scheduler
        .update_task(parent_id, |t| t.child_ids.push(child_id))
        .unwrap();
    scheduler.set_status(parent_id, TaskStatus::Waiting).unwrap();

    // Parent Waiting, child Pending-then-Running, same parent_id — the
    // scheduler now hands out the child, not the parent.
    let next = scheduler.next_eligible().expect("child is eligible");
    assert_eq!(next.id, child_id);
    assert_eq!(next.parent_id, Some(parent_id));

    scheduler.set_status(child_id, TaskStatus::Planning).unwrap();
    scheduler.set_status(child_id, TaskStatus::Running).unwrap();
    scheduler
        .update_task(child_id, |t| t.result = Some("wrote a.txt".into()))
        .unwrap();
    scheduler.set_status(child_id, TaskStatus::Complete).unwrap();

    // Resolving the child re-queues the parent (the session-turn append
    // itself is exercised in `orchestrator.rs`'s own unit tests, which
    // need a real `IterationLoop`/session store to hand the turn to).
    scheduler.set_status(parent_id, TaskStatus::Pending).unwrap();

    let next = scheduler.next_eligible().expect("parent eligible again");
    assert_eq!(next.id, parent_id);
    assert_eq!(next.child_ids, vec![child_id]);
    assert!(scheduler.has_work());
}

#[test]
fn non_delegate_tool_metadata_is_not_mistaken_for_delegation() {
    let mut metadata = HashMap::new();
    metadata.insert("kind".to_string(), json!("write_file"));
    assert!(DelegateRequest::from_metadata(&metadata).is_none());
}
