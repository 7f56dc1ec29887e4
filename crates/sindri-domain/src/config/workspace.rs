use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Workspace
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Filesystem roots the runtime is allowed to touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Working directory file-operation tools resolve paths against.
    /// Tools MUST reject any path that would escape this root.
    #[serde(default = "d_ws_path")]
    pub path: PathBuf,
    /// Directory where session checkpoints and the session database live.
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./workspace"),
            state_path: PathBuf::from("./data/state"),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_ws_path() -> PathBuf {
    PathBuf::from("./workspace")
}
fn d_state_path() -> PathBuf {
    PathBuf::from("./data/state")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = WorkspaceConfig::default();
        assert_eq!(cfg.path, PathBuf::from("./workspace"));
        assert_eq!(cfg.state_path, PathBuf::from("./data/state"));
    }

    #[test]
    fn deserialize_missing_fields_uses_defaults() {
        let cfg: WorkspaceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.path, PathBuf::from("./workspace"));
    }
}
