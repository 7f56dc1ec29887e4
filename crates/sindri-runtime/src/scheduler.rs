//! Task Scheduler (C9, spec §4.9): an in-memory registry of `Task`s keyed
//! by id. A data structure only — it never executes anything itself.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use sindri_domain::error::{Error, Result};
use sindri_domain::model::{Event, Task, TaskStatus};
use sindri_events::EventBus;

pub struct Scheduler {
    tasks: RwLock<HashMap<Uuid, Task>>,
    events: Arc<EventBus>,
    sequence: std::sync::atomic::AtomicU64,
}

impl Scheduler {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            events,
            sequence: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Insert a task, assigning it the next insertion sequence number
    /// (used to break priority ties in `next_eligible`).
    pub fn add_task(&self, mut task: Task) -> Uuid {
        let id = task.id;
        task.sequence = self.sequence.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.events.publish(Event::TaskCreated {
            task_id: id,
            agent: task.assigned_agent.clone(),
            parent_id: task.parent_id,
        });
        self.tasks.write().insert(id, task);
        id
    }

    pub fn get_task(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().get(&id).cloned()
    }

    pub fn remove_task(&self, id: Uuid) -> Option<Task> {
        self.tasks.write().remove(&id)
    }

    /// Apply a mutation to a task under the scheduler's lock.
    pub fn update_task(&self, id: Uuid, f: impl FnOnce(&mut Task)) -> Result<()> {
        let mut tasks = self.tasks.write();
        match tasks.get_mut(&id) {
            Some(task) => {
                f(task);
                Ok(())
            }
            None => Err(Error::Other(format!("no such task: {id}"))),
        }
    }

    /// Enforce a valid status transition and publish `TaskStatusChanged`.
    pub fn set_status(&self, id: Uuid, new_status: TaskStatus) -> Result<()> {
        let from = {
            let mut tasks = self.tasks.write();
            let task = tasks
                .get_mut(&id)
                .ok_or_else(|| Error::Other(format!("no such task: {id}")))?;
            let from = task.status;
            if !from.can_transition_to(new_status) {
                return Err(Error::Other(format!(
                    "illegal task transition: {from:?} -> {new_status:?}"
                )));
            }
            task.status = new_status;
            from
        };
        self.events.publish(Event::TaskStatusChanged {
            task_id: id,
            from,
            to: new_status,
        });
        Ok(())
    }

    /// The highest-priority (smallest integer wins, ties broken by
    /// insertion order) Pending task whose dependencies are all terminal.
    pub fn next_eligible(&self) -> Option<Task> {
        let tasks = self.tasks.read();
        tasks
            .values()
            .filter(|t| t.status == TaskStatus::Pending)
            .filter(|t| {
                t.dependencies.iter().all(|dep| {
                    tasks
                        .get(dep)
                        .map(|d| d.status.is_terminal())
                        .unwrap_or(true)
                })
            })
            .min_by_key(|t| (t.priority, t.sequence))
            .cloned()
    }

    /// True if any task is not yet terminal.
    pub fn has_work(&self) -> bool {
        self.tasks.read().values().any(|t| !t.status.is_terminal())
    }

    pub fn task_count(&self) -> usize {
        self.tasks.read().len()
    }
}
