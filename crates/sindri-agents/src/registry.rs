//! Agent Registry (C7, spec §4.7): a read-only mapping from agent name to
//! `AgentDefinition`, seeded with the default catalog and extensible at
//! startup from an on-disk directory of TOML plugin files.

use std::collections::HashMap;

use sindri_domain::error::{Error, Result};

use crate::definition::{AgentCatalogFile, AgentDefinition};
use crate::prompts;

/// Read-only mapping from agent name to its definition.
pub struct AgentRegistry {
    agents: HashMap<String, AgentDefinition>,
}

impl AgentRegistry {
    /// Start from an empty registry — no built-in agents.
    pub fn empty() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// The default seven-agent catalog ported from the original runtime
    /// (spec §11.3): `brokkr` as the dispatcher, the rest specialists.
    pub fn with_defaults() -> Self {
        let mut reg = Self::empty();
        for def in default_catalog() {
            reg.insert(def);
        }
        reg
    }

    pub fn insert(&mut self, def: AgentDefinition) {
        self.agents.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &str) -> Result<&AgentDefinition> {
        self.agents
            .get(name)
            .ok_or_else(|| Error::UnknownAgent(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    /// Load every `*.toml` file in `dir` as an `AgentCatalogFile`,
    /// inserting (and overriding any same-named default) each one. Does
    /// not hot-reload — callers call this once at startup.
    pub fn load_plugin_dir(&mut self, dir: &std::path::Path) -> std::io::Result<usize> {
        let mut loaded = 0;
        if !dir.is_dir() {
            return Ok(0);
        }
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let raw = std::fs::read_to_string(&path)?;
            match toml::from_str::<AgentCatalogFile>(&raw) {
                Ok(file) => {
                    tracing::info!(agent = %file.agent.name, path = %path.display(), "loaded agent plugin");
                    self.insert(file.into());
                    loaded += 1;
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping malformed agent plugin");
                }
            }
        }
        Ok(loaded)
    }
}

fn default_catalog() -> Vec<AgentDefinition> {
    vec![
        AgentDefinition {
            name: "brokkr".into(),
            role: "Master orchestrator - handles simple tasks, delegates complex work".into(),
            model: "qwen2.5-coder:14b".into(),
            estimated_vram_gb: 9.0,
            fallback_model: Some("qwen2.5-coder:7b".into()),
            fallback_vram_gb: Some(5.0),
            system_prompt: prompts::BROKKR_PROMPT.into(),
            tools: vec![
                "read_file".into(),
                "write_file".into(),
                "append_file".into(),
                "move_file".into(),
                "delete_file".into(),
                "list_files".into(),
                "exec".into(),
                "process".into(),
                "delegate".into(),
            ],
            can_delegate: true,
            delegate_to: vec![
                "huginn".into(),
                "mimir".into(),
                "skald".into(),
                "fenrir".into(),
                "odin".into(),
            ],
            max_iterations: 15,
            temperature: 0.3,
            priority: 0,
        },
        AgentDefinition {
            name: "huginn".into(),
            role: "Code implementation specialist".into(),
            model: "qwen2.5-coder:7b".into(),
            estimated_vram_gb: 5.0,
            fallback_model: Some("qwen2.5:3b-instruct-q8_0".into()),
            fallback_vram_gb: Some(3.0),
            system_prompt: prompts::HUGINN_PROMPT.into(),
            tools: vec![
                "read_file".into(),
                "write_file".into(),
                "append_file".into(),
                "move_file".into(),
                "list_files".into(),
                "exec".into(),
                "process".into(),
                "delegate".into(),
            ],
            can_delegate: true,
            delegate_to: vec!["ratatoskr".into(), "skald".into()],
            max_iterations: 30,
            temperature: 0.3,
            priority: 1,
        },
        AgentDefinition {
            name: "mimir".into(),
            role: "Code reviewer and quality checker".into(),
            model: "llama3.1:8b".into(),
            estimated_vram_gb: 5.0,
            fallback_model: Some("qwen2.5:3b-instruct-q8_0".into()),
            fallback_vram_gb: Some(3.0),
            system_prompt: prompts::MIMIR_PROMPT.into(),
            tools: vec![
                "read_file".into(),
                "list_files".into(),
                "exec".into(),
                "process".into(),
            ],
            can_delegate: false,
            delegate_to: vec![],
            max_iterations: 20,
            temperature: 0.3,
            priority: 1,
        },
        AgentDefinition {
            name: "ratatoskr".into(),
            role: "Fast executor for simple tasks".into(),
            model: "qwen2.5:3b-instruct-q8_0".into(),
            estimated_vram_gb: 3.0,
            fallback_model: None,
            fallback_vram_gb: None,
            system_prompt: prompts::RATATOSKR_PROMPT.into(),
            tools: vec!["exec".into(), "read_file".into(), "write_file".into()],
            can_delegate: false,
            delegate_to: vec![],
            max_iterations: 10,
            temperature: 0.3,
            priority: 2,
        },
        AgentDefinition {
            name: "skald".into(),
            role: "Test writer and quality guardian".into(),
            model: "qwen2.5-coder:7b".into(),
            estimated_vram_gb: 5.0,
            fallback_model: Some("qwen2.5:3b-instruct-q8_0".into()),
            fallback_vram_gb: Some(3.0),
            system_prompt: prompts::SKALD_PROMPT.into(),
            tools: vec!["read_file".into(), "write_file".into(), "exec".into()],
            can_delegate: false,
            delegate_to: vec![],
            max_iterations: 25,
            temperature: 0.3,
            priority: 1,
        },
        AgentDefinition {
            name: "fenrir".into(),
            role: "SQL and data specialist".into(),
            model: "sqlcoder:7b".into(),
            estimated_vram_gb: 5.0,
            fallback_model: None,
            fallback_vram_gb: None,
            system_prompt: prompts::FENRIR_PROMPT.into(),
            tools: vec!["read_file".into(), "write_file".into(), "exec".into()],
            can_delegate: false,
            delegate_to: vec![],
            max_iterations: 20,
            temperature: 0.3,
            priority: 1,
        },
        AgentDefinition {
            name: "odin".into(),
            role: "Deep reasoning and planning specialist".into(),
            model: "deepseek-r1:8b".into(),
            estimated_vram_gb: 6.0,
            fallback_model: Some("qwen2.5-coder:7b".into()),
            fallback_vram_gb: Some(5.0),
            system_prompt: prompts::ODIN_PROMPT.into(),
            tools: vec![
                "read_file".into(),
                "list_files".into(),
                "exec".into(),
                "delegate".into(),
            ],
            can_delegate: true,
            delegate_to: vec!["huginn".into(), "skald".into(), "fenrir".into()],
            max_iterations: 15,
            temperature: 0.7,
            priority: 0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_seven_agents() {
        let reg = AgentRegistry::with_defaults();
        assert_eq!(reg.names().len(), 7);
    }

    #[test]
    fn get_unknown_agent_errors() {
        let reg = AgentRegistry::with_defaults();
        assert!(matches!(reg.get("nonexistent"), Err(Error::UnknownAgent(_))));
    }

    #[test]
    fn brokkr_delegate_targets_all_resolve() {
        let reg = AgentRegistry::with_defaults();
        let brokkr = reg.get("brokkr").unwrap();
        for target in &brokkr.delegate_to {
            assert!(reg.get(target).is_ok(), "delegate target {target} must resolve");
        }
    }

    #[test]
    fn delegate_tool_only_present_when_can_delegate() {
        let reg = AgentRegistry::with_defaults();
        for name in reg.names() {
            let def = reg.get(name).unwrap();
            assert_eq!(def.allows_tool("delegate"), def.can_delegate, "agent {name}");
        }
    }

    #[test]
    fn load_plugin_dir_adds_and_overrides_agents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.toml");
        std::fs::write(
            &path,
            r#"
            [agent]
            name = "scout"
            role = "quick lookups"
            model = "qwen2.5:3b"
            estimated_vram_gb = 3.0

            [prompt]
            content = "You are Scout."
            "#,
        )
        .unwrap();

        let mut reg = AgentRegistry::with_defaults();
        let loaded = reg.load_plugin_dir(dir.path()).unwrap();
        assert_eq!(loaded, 1);
        assert!(reg.get("scout").is_ok());
    }

    #[test]
    fn load_plugin_dir_on_missing_directory_is_a_no_op() {
        let mut reg = AgentRegistry::with_defaults();
        let loaded = reg.load_plugin_dir(std::path::Path::new("/nonexistent/path")).unwrap();
        assert_eq!(loaded, 0);
        assert_eq!(reg.names().len(), 7);
    }
}
