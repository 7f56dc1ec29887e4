//! Model-size classification (SPEC_FULL §11.4).
//!
//! Bookkeeping only — does not affect `ModelClient::chat`/`chat_stream`
//! semantics. The Agent Registry's TOML loader consults `DEFAULT_MODELS`
//! when a catalog entry names a role (`coder`, `general`, `small`) instead
//! of a literal model id, and `ModelSize` gives a coarse VRAM-class hint
//! for defaulting `estimated_vram_gb` when a catalog entry omits one.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Small,
    Medium,
    Large,
}

impl ModelSize {
    /// A conservative VRAM estimate in gigabytes for this size class, used
    /// only when a catalog entry provides neither a model-specific estimate
    /// nor its own size class.
    pub fn default_vram_gb(self) -> f64 {
        match self {
            ModelSize::Small => 4.0,
            ModelSize::Medium => 10.0,
            ModelSize::Large => 20.0,
        }
    }
}

/// Default model ids for each role, mirroring the original runtime's
/// `DEFAULT_MODELS` table.
pub fn default_models() -> HashMap<&'static str, &'static str> {
    let mut map = HashMap::new();
    map.insert("coder", "qwen2.5-coder:14b");
    map.insert("general", "qwen2.5:7b");
    map.insert("small", "qwen2.5:3b");
    map
}
