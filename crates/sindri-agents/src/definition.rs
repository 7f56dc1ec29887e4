//! Agent Definition (spec §2, §4.7): the immutable, registry-provided
//! description of one agent — its model, tools, and delegation rights.

use serde::Deserialize;

/// Immutable description of one agent. Registry-provided; never mutated
/// once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDefinition {
    pub name: String,
    pub role: String,
    pub model: String,
    pub estimated_vram_gb: f64,
    pub fallback_model: Option<String>,
    pub fallback_vram_gb: Option<f64>,
    pub system_prompt: String,
    pub tools: Vec<String>,
    pub can_delegate: bool,
    pub delegate_to: Vec<String>,
    pub max_iterations: u32,
    pub temperature: f64,
    /// Lower is more important; used to break ties when several agents
    /// contend for the same VRAM budget.
    pub priority: u32,
}

impl AgentDefinition {
    /// True if `tool` is in this agent's permitted tool set.
    pub fn allows_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }
}

/// On-disk shape of a `[metadata]`/`[agent]`/`[prompt]` TOML catalog file
/// (spec §6, "Agent catalog file (plugin)").
#[derive(Debug, Deserialize)]
pub struct AgentCatalogFile {
    #[serde(default)]
    pub metadata: CatalogMetadata,
    pub agent: CatalogAgent,
    pub prompt: CatalogPrompt,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogMetadata {
    pub version: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogAgent {
    pub name: String,
    pub role: String,
    pub model: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    pub estimated_vram_gb: Option<f64>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub can_delegate: bool,
    #[serde(default)]
    pub delegate_to: Vec<String>,
    pub fallback_model: Option<String>,
    pub fallback_vram_gb: Option<f64>,
    /// Coarse VRAM-class hint consulted when `estimated_vram_gb` is
    /// omitted (spec §11.4).
    pub model_size: Option<sindri_llm::ModelSize>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogPrompt {
    pub content: String,
}

fn default_max_iterations() -> u32 {
    20
}

fn default_temperature() -> f64 {
    0.3
}

impl From<AgentCatalogFile> for AgentDefinition {
    fn from(file: AgentCatalogFile) -> Self {
        let estimated_vram_gb = file
            .agent
            .estimated_vram_gb
            .or_else(|| file.agent.model_size.map(|s| s.default_vram_gb()))
            .unwrap_or_else(|| sindri_llm::ModelSize::Medium.default_vram_gb());

        AgentDefinition {
            name: file.agent.name,
            role: file.agent.role,
            model: file.agent.model,
            estimated_vram_gb,
            fallback_model: file.agent.fallback_model,
            fallback_vram_gb: file.agent.fallback_vram_gb,
            system_prompt: file.prompt.content,
            tools: file.agent.tools,
            can_delegate: file.agent.can_delegate,
            delegate_to: file.agent.delegate_to,
            max_iterations: file.agent.max_iterations,
            temperature: file.agent.temperature,
            priority: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_tool_checks_membership() {
        let def = AgentDefinition {
            name: "test".into(),
            role: "tester".into(),
            model: "m".into(),
            estimated_vram_gb: 1.0,
            fallback_model: None,
            fallback_vram_gb: None,
            system_prompt: String::new(),
            tools: vec!["read_file".into(), "exec".into()],
            can_delegate: false,
            delegate_to: vec![],
            max_iterations: 10,
            temperature: 0.3,
            priority: 1,
        };
        assert!(def.allows_tool("read_file"));
        assert!(!def.allows_tool("delegate"));
    }

    #[test]
    fn catalog_file_defaults_vram_from_model_size_when_omitted() {
        let toml_src = r#"
            [agent]
            name = "scout"
            role = "quick lookups"
            model = "qwen2.5:3b"
            model_size = "small"

            [prompt]
            content = "You are Scout."
        "#;
        let file: AgentCatalogFile = toml::from_str(toml_src).unwrap();
        let def: AgentDefinition = file.into();
        assert_eq!(def.estimated_vram_gb, 4.0);
        assert_eq!(def.max_iterations, 20);
    }
}
