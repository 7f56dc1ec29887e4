use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Iteration loop
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Governs a single agent's iteration loop: completion detection, stuck
/// detection, and checkpoint cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Hard ceiling on iterations for one task run before it is failed
    /// with `MaxIterations`.
    #[serde(default = "d_max_iterations")]
    pub max_iterations: u32,
    /// Literal marker the model emits to signal it considers the task
    /// done. Checked only after any tool calls in that iteration have
    /// executed.
    #[serde(default = "d_completion_marker")]
    pub completion_marker: String,
    /// Number of consecutive iterations with no forward progress
    /// (repeated tool calls, empty responses) before a nudge is injected.
    #[serde(default = "d_stuck_threshold")]
    pub stuck_threshold: u32,
    /// Number of nudges tolerated before the task is failed with
    /// `StuckAgent`.
    #[serde(default = "d_max_nudges")]
    pub max_nudges: u32,
    /// Checkpoint the session every N iterations, in addition to
    /// checkpointing on suspend/complete/fail.
    #[serde(default = "d_checkpoint_interval")]
    pub checkpoint_interval: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            completion_marker: "<sindri:complete/>".to_string(),
            stuck_threshold: 3,
            max_nudges: 2,
            checkpoint_interval: 5,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_max_iterations() -> u32 {
    50
}
fn d_completion_marker() -> String {
    "<sindri:complete/>".to_string()
}
fn d_stuck_threshold() -> u32 {
    3
}
fn d_max_nudges() -> u32 {
    2
}
fn d_checkpoint_interval() -> u32 {
    5
}
