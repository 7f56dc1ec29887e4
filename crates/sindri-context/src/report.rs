use serde::{Deserialize, Serialize};

/// Per-section report within one context pack build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionReport {
    pub name: String,
    pub raw_chars: usize,
    pub injected_chars: usize,
    pub truncated_per_section: bool,
    pub truncated_total_cap: bool,
    pub included: bool,
}

/// Full report of one context pack build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextReport {
    pub sections: Vec<SectionReport>,
    pub turns_included: usize,
    pub turns_dropped: usize,
    pub total_injected_chars: usize,
}
