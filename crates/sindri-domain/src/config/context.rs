use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Context budget
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-section character caps for context assembly.
///
/// The stored turn transcript (working memory) always gets at least
/// `working_memory_min_share` of `total_budget_chars`; the remaining
/// sections are pre-allocated fixed caps and truncated individually before
/// the whole pack is assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Overall character budget for one assembled context pack.
    #[serde(default = "d_total_budget")]
    pub total_budget_chars: usize,
    /// Minimum fraction of `total_budget_chars` reserved for the stored
    /// turn transcript, expressed as `0.0..=1.0`.
    #[serde(default = "d_working_memory_min_share")]
    pub working_memory_min_share: f64,
    /// Cap for the project-structure summary section.
    #[serde(default = "d_project_structure_max")]
    pub project_structure_max_chars: usize,
    /// Cap for the learned-pattern-suggestions section.
    #[serde(default = "d_pattern_suggestions_max")]
    pub pattern_suggestions_max_chars: usize,
    /// Cap for the semantic memory excerpt section.
    #[serde(default = "d_semantic_memory_max")]
    pub semantic_memory_max_chars: usize,
    /// Cap for the episodic memory excerpt section.
    #[serde(default = "d_episodic_memory_max")]
    pub episodic_memory_max_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            total_budget_chars: 64_000,
            working_memory_min_share: 0.5,
            project_structure_max_chars: 6_000,
            pattern_suggestions_max_chars: 4_000,
            semantic_memory_max_chars: 6_000,
            episodic_memory_max_chars: 6_000,
        }
    }
}

impl ContextConfig {
    /// Character budget guaranteed to the working-memory (turn transcript)
    /// section after the other sections take their fixed caps.
    pub fn working_memory_floor(&self) -> usize {
        (self.total_budget_chars as f64 * self.working_memory_min_share) as usize
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_total_budget() -> usize {
    64_000
}
fn d_working_memory_min_share() -> f64 {
    0.5
}
fn d_project_structure_max() -> usize {
    6_000
}
fn d_pattern_suggestions_max() -> usize {
    4_000
}
fn d_semantic_memory_max() -> usize {
    6_000
}
fn d_episodic_memory_max() -> usize {
    6_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ContextConfig::default();
        assert_eq!(cfg.total_budget_chars, 64_000);
        assert_eq!(cfg.working_memory_floor(), 32_000);
    }

    #[test]
    fn deserialize_missing_fields_uses_defaults() {
        let cfg: ContextConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.pattern_suggestions_max_chars, 4_000);
    }

    #[test]
    fn custom_share_changes_floor() {
        let cfg = ContextConfig {
            total_budget_chars: 10_000,
            working_memory_min_share: 0.7,
            ..ContextConfig::default()
        };
        assert_eq!(cfg.working_memory_floor(), 7_000);
    }
}
