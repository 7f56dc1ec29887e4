use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// VRAM budget
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hardware VRAM budget the model manager admits models against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VramConfig {
    /// Total VRAM available on the host, in gigabytes.
    #[serde(default = "d_total_vram_gb")]
    pub total_vram_gb: f64,
    /// VRAM held back for the OS/other processes — never allocated to a
    /// model.
    #[serde(default = "d_reserve_vram_gb")]
    pub reserve_vram_gb: f64,
}

impl Default for VramConfig {
    fn default() -> Self {
        Self {
            total_vram_gb: 16.0,
            reserve_vram_gb: 2.0,
        }
    }
}

impl VramConfig {
    /// VRAM actually available for model admission.
    pub fn usable_vram_gb(&self) -> f64 {
        (self.total_vram_gb - self.reserve_vram_gb).max(0.0)
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_total_vram_gb() -> f64 {
    16.0
}
fn d_reserve_vram_gb() -> f64 {
    2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_constants() {
        let cfg = VramConfig::default();
        assert_eq!(cfg.total_vram_gb, 16.0);
        assert_eq!(cfg.reserve_vram_gb, 2.0);
        assert_eq!(cfg.usable_vram_gb(), 14.0);
    }

    #[test]
    fn usable_never_negative() {
        let cfg = VramConfig {
            total_vram_gb: 4.0,
            reserve_vram_gb: 8.0,
        };
        assert_eq!(cfg.usable_vram_gb(), 0.0);
    }

    #[test]
    fn deserialize_missing_fields_uses_defaults() {
        let cfg: VramConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.total_vram_gb, 16.0);
    }
}
