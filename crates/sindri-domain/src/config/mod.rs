mod agents;
mod context;
mod llm;
mod loop_;
mod sessions;
mod tools;
mod vram;
mod workspace;

pub use agents::*;
pub use context::*;
pub use llm::*;
pub use loop_::*;
pub use sessions::*;
pub use tools::*;
pub use vram::*;
pub use workspace::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub vram: VramConfig,
    #[serde(default, rename = "loop")]
    pub loop_: LoopConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub context: ContextConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent catalog location
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the agent registry loads its catalog from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Additional TOML catalog files merged on top of the built-in default
    /// catalog. Agents with the same id override the built-in definition.
    #[serde(default)]
    pub catalog_paths: Vec<std::path::PathBuf>,
    /// Shared delegation limits applied to every agent unless its own
    /// definition overrides them.
    #[serde(default)]
    pub default_limits: AgentLimits,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            catalog_paths: Vec::new(),
            default_limits: AgentLimits::default(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Never panics. Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.llm.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        } else if !self.llm.base_url.starts_with("http://")
            && !self.llm.base_url.starts_with("https://")
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.base_url".into(),
                message: format!(
                    "base_url must start with http:// or https:// (got \"{}\")",
                    self.llm.base_url
                ),
            });
        }

        if self.vram.reserve_vram_gb >= self.vram.total_vram_gb {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "vram.reserve_vram_gb".into(),
                message: "reserve_vram_gb must be less than total_vram_gb".into(),
            });
        }

        if self.loop_.max_iterations == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "loop.max_iterations".into(),
                message: "max_iterations must be greater than 0".into(),
            });
        }

        if self.loop_.stuck_threshold == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "loop.stuck_threshold".into(),
                message: "stuck_threshold must be greater than 0".into(),
            });
        }

        if self.loop_.completion_marker.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "loop.completion_marker".into(),
                message: "completion_marker must not be empty".into(),
            });
        }

        for (i, pattern) in self.tools.exec_security.denied_patterns.iter().enumerate() {
            if let Err(e) = regex::Regex::new(pattern) {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: format!("tools.exec_security.denied_patterns[{i}]"),
                    message: format!("invalid regex \"{pattern}\": {e}"),
                });
            }
        }

        for (i, path) in self.agents.catalog_paths.iter().enumerate() {
            if !path.exists() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: format!("agents.catalog_paths[{i}]"),
                    message: format!("catalog file {} does not exist", path.display()),
                });
            }
        }

        if self.context.working_memory_min_share < 0.0 || self.context.working_memory_min_share > 1.0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "context.working_memory_min_share".into(),
                message: "working_memory_min_share must be between 0.0 and 1.0".into(),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn find_issue<'a>(issues: &'a [ConfigError], field_prefix: &str) -> Option<&'a ConfigError> {
        issues.iter().find(|e| e.field.starts_with(field_prefix))
    }

    #[test]
    fn default_config_passes() {
        let issues = Config::default().validate();
        let errors: Vec<_> = issues
            .iter()
            .filter(|e| e.severity == ConfigSeverity::Error)
            .collect();
        assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
    }

    #[test]
    fn empty_base_url_is_error() {
        let mut cfg = Config::default();
        cfg.llm.base_url = String::new();
        let issues = cfg.validate();
        let issue = find_issue(&issues, "llm.base_url").expect("expected base_url error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn invalid_scheme_base_url_is_error() {
        let mut cfg = Config::default();
        cfg.llm.base_url = "ftp://localhost:11434".into();
        let issues = cfg.validate();
        let issue = find_issue(&issues, "llm.base_url").expect("expected scheme error");
        assert!(issue.message.contains("http://"));
    }

    #[test]
    fn reserve_vram_must_be_less_than_total() {
        let mut cfg = Config::default();
        cfg.vram.reserve_vram_gb = 20.0;
        cfg.vram.total_vram_gb = 16.0;
        let issues = cfg.validate();
        let issue =
            find_issue(&issues, "vram.reserve_vram_gb").expect("expected vram error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn zero_max_iterations_is_error() {
        let mut cfg = Config::default();
        cfg.loop_.max_iterations = 0;
        let issues = cfg.validate();
        assert!(find_issue(&issues, "loop.max_iterations").is_some());
    }

    #[test]
    fn invalid_denied_pattern_is_error() {
        let mut cfg = Config::default();
        cfg.tools.exec_security.denied_patterns = vec![r"[invalid".into()];
        let issues = cfg.validate();
        let issue = find_issue(&issues, "tools.exec_security.denied_patterns[0]")
            .expect("expected regex error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn missing_catalog_path_is_warning() {
        let mut cfg = Config::default();
        cfg.agents.catalog_paths = vec!["/does/not/exist.toml".into()];
        let issues = cfg.validate();
        let issue = find_issue(&issues, "agents.catalog_paths[0]")
            .expect("expected missing catalog warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn config_error_display_format() {
        let err = ConfigError {
            severity: ConfigSeverity::Error,
            field: "llm.base_url".into(),
            message: "base_url must not be empty".into(),
        };
        assert_eq!(
            format!("{err}"),
            "[ERROR] llm.base_url: base_url must not be empty"
        );
    }
}
