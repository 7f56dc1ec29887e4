use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the embedded session database and checkpoint files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Path to the sqlite database file. Relative to `workspace.state_path`
    /// unless absolute.
    #[serde(default = "d_database_path")]
    pub database_path: PathBuf,
    /// Sessions idle for longer than this are eligible for cleanup by the
    /// recovery manager's sweep. `None` disables the sweep.
    #[serde(default = "d_stale_after_hours")]
    pub stale_after_hours: Option<u64>,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            database_path: d_database_path(),
            stale_after_hours: d_stale_after_hours(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_database_path() -> PathBuf {
    PathBuf::from("sindri.db")
}
fn d_stale_after_hours() -> Option<u64> {
    Some(24 * 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SessionsConfig::default();
        assert_eq!(cfg.database_path, PathBuf::from("sindri.db"));
        assert_eq!(cfg.stale_after_hours, Some(168));
    }

    #[test]
    fn deserialize_missing_fields_uses_defaults() {
        let cfg: SessionsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.database_path, PathBuf::from("sindri.db"));
    }

    #[test]
    fn stale_sweep_can_be_disabled() {
        let cfg: SessionsConfig =
            serde_json::from_str(r#"{"stale_after_hours": null}"#).unwrap();
        assert_eq!(cfg.stale_after_hours, None);
    }
}
