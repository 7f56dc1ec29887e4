//! Recovery Manager (spec §4.11, C11): atomic per-session checkpoint files.
//!
//! One file per session, named `<session_id>.checkpoint.json`, written via a
//! temp-file-then-rename so a crash mid-write never leaves a torn file —
//! the same idiom `sindri-tools`'s exec sessions use for their output logs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use sindri_domain::model::{Checkpoint, CheckpointState, CheckpointSummary};

pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, session_id: Uuid) -> PathBuf {
        self.dir.join(format!("{session_id}.checkpoint.json"))
    }

    /// Write a checkpoint atomically. Failure is never fatal to the caller
    /// — the loop keeps running even if a checkpoint write fails — so this
    /// returns `bool` (`true` on success) and logs a warning on failure
    /// rather than propagating `sindri_domain::Error`.
    pub fn save_checkpoint(&self, session_id: Uuid, state: CheckpointState) -> bool {
        let checkpoint = Checkpoint {
            session_id,
            timestamp: Utc::now(),
            state,
        };
        match self.write_atomic(session_id, &checkpoint) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "checkpoint write failed");
                false
            }
        }
    }

    fn write_atomic(&self, session_id: Uuid, checkpoint: &Checkpoint) -> std::io::Result<()> {
        let final_path = self.path_for(session_id);
        let tmp_path = self.dir.join(format!("{session_id}.checkpoint.json.tmp"));
        let bytes = serde_json::to_vec_pretty(checkpoint)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    pub fn has_checkpoint(&self, session_id: Uuid) -> bool {
        self.path_for(session_id).exists()
    }

    /// Loads a checkpoint, tolerating a corrupt or partially-written file as
    /// "no checkpoint" rather than an error — recovery degrades to "start
    /// over" instead of blocking startup.
    pub fn load_checkpoint(&self, session_id: Uuid) -> Option<CheckpointState> {
        let bytes = fs::read(self.path_for(session_id)).ok()?;
        let checkpoint: Checkpoint = serde_json::from_slice(&bytes).ok()?;
        Some(checkpoint.state)
    }

    pub fn clear_checkpoint(&self, session_id: Uuid) -> bool {
        match fs::remove_file(self.path_for(session_id)) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "checkpoint removal failed");
                false
            }
        }
    }

    /// All recoverable checkpoints, newest first.
    pub fn list_recoverable_sessions(&self) -> Vec<CheckpointSummary> {
        let mut summaries: Vec<CheckpointSummary> = Self::read_dir_entries(&self.dir)
            .into_iter()
            .filter_map(|path| {
                let bytes = fs::read(&path).ok()?;
                let checkpoint: Checkpoint = serde_json::from_slice(&bytes).ok()?;
                Some(CheckpointSummary {
                    session_id: checkpoint.session_id,
                    timestamp: checkpoint.timestamp,
                    task: checkpoint.state.task,
                    agent: checkpoint.state.agent,
                    iteration: checkpoint.state.iteration,
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        summaries
    }

    /// Remove checkpoints beyond `keep` most-recent, or older than
    /// `max_age_days` when given. Returns the number removed.
    pub fn cleanup_old_checkpoints(&self, keep: usize, max_age_days: Option<i64>) -> usize {
        let mut summaries = self.list_recoverable_sessions();
        let mut removed = 0;

        if let Some(max_age_days) = max_age_days {
            let cutoff = Utc::now() - chrono::Duration::days(max_age_days);
            summaries.retain(|s| {
                if s.timestamp < cutoff {
                    if self.clear_checkpoint(s.session_id) {
                        removed += 1;
                    }
                    false
                } else {
                    true
                }
            });
        }

        if summaries.len() > keep {
            for s in summaries.into_iter().skip(keep) {
                if self.clear_checkpoint(s.session_id) {
                    removed += 1;
                }
            }
        }

        removed
    }

    fn read_dir_entries(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| {
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.ends_with(".checkpoint.json"))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state(task: &str, iteration: u32) -> CheckpointState {
        CheckpointState {
            task: task.to_string(),
            iteration,
            agent: "huginn".to_string(),
            recent_turns: Vec::new(),
        }
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        let session_id = Uuid::new_v4();

        assert!(store.save_checkpoint(session_id, sample_state("write file", 3)));
        assert!(store.has_checkpoint(session_id));

        let loaded = store.load_checkpoint(session_id).unwrap();
        assert_eq!(loaded.iteration, 3);
        assert_eq!(loaded.task, "write file");
    }

    #[test]
    fn missing_checkpoint_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        assert!(store.load_checkpoint(Uuid::new_v4()).is_none());
    }

    #[test]
    fn corrupt_checkpoint_loads_as_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        let session_id = Uuid::new_v4();
        std::fs::write(store.path_for(session_id), b"not json").unwrap();
        assert!(store.load_checkpoint(session_id).is_none());
    }

    #[test]
    fn clear_checkpoint_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        let session_id = Uuid::new_v4();
        store.save_checkpoint(session_id, sample_state("task", 1));
        assert!(store.clear_checkpoint(session_id));
        assert!(!store.has_checkpoint(session_id));
    }

    #[test]
    fn clear_missing_checkpoint_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        assert!(store.clear_checkpoint(Uuid::new_v4()));
    }

    #[test]
    fn list_recoverable_sessions_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        store.save_checkpoint(first, sample_state("first", 1));
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.save_checkpoint(second, sample_state("second", 1));

        let sessions = store.list_recoverable_sessions();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, second);
    }

    #[test]
    fn cleanup_old_checkpoints_keeps_only_n_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).unwrap();
        for i in 0..5 {
            store.save_checkpoint(Uuid::new_v4(), sample_state(&format!("t{i}"), 1));
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        let removed = store.cleanup_old_checkpoints(2, None);
        assert_eq!(removed, 3);
        assert_eq!(store.list_recoverable_sessions().len(), 2);
    }
}
