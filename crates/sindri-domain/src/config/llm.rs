use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model runtime
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the local model runtime. Sindri talks to a
/// single Ollama-compatible endpoint; agents select a model by name from
/// the runtime's catalog rather than by provider/role routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the local model runtime, e.g. `http://localhost:11434`.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Model used when an agent definition does not name one.
    #[serde(default = "d_default_model")]
    pub default_model: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "d_timeout_ms")]
    pub default_timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            default_model: d_default_model(),
            default_timeout_ms: d_timeout_ms(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn d_default_model() -> String {
    "qwen2.5-coder:14b".to_string()
}
fn d_timeout_ms() -> u64 {
    20_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_constants() {
        let cfg = LlmConfig::default();
        assert_eq!(cfg.base_url, "http://localhost:11434");
        assert_eq!(cfg.default_model, "qwen2.5-coder:14b");
    }

    #[test]
    fn deserialize_missing_fields_uses_defaults() {
        let cfg: LlmConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.default_timeout_ms, 20_000);
    }

    #[test]
    fn deserialize_partial_override() {
        let cfg: LlmConfig =
            serde_json::from_str(r#"{"base_url": "http://gpu-box:11434"}"#).unwrap();
        assert_eq!(cfg.base_url, "http://gpu-box:11434");
        assert_eq!(cfg.default_model, "qwen2.5-coder:14b");
    }
}
