use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sindri_agents::AgentRegistry;
use sindri_domain::config::{Config, ConfigSeverity};
use sindri_events::EventBus;
use sindri_llm::ModelClient;
use sindri_models::ModelManager;
use sindri_runtime::{IterationLoop, Orchestrator, Scheduler};
use sindri_sessions::{CheckpointStore, SessionStore};
use sindri_tools::ProcessManager;

/// Sindri — a hierarchical local-LLM agent execution engine.
#[derive(Debug, Parser)]
#[command(name = "sindri", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a task to an agent and print the final result.
    Run {
        /// The task description handed to the dispatcher agent.
        task: String,
        /// Which agent dispatches the task (default: brokkr).
        #[arg(long, default_value = "brokkr")]
        agent: String,
        /// Print the full run outcome as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            println!("sindri {} — pass a subcommand, e.g. `sindri run \"...\"`", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Run { task, agent, json }) => {
            init_tracing();
            let (config, _path) = load_config()?;
            run_task(config, task, agent, json).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, path) = load_config()?;
            let issues = config.validate();
            for issue in &issues {
                match issue.severity {
                    ConfigSeverity::Warning => tracing::warn!("{issue}"),
                    ConfigSeverity::Error => tracing::error!("{issue}"),
                }
                println!("{issue}");
            }
            if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
                anyhow::bail!("config at {path} failed validation");
            }
            println!("config at {path} is valid");
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _path) = load_config()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Command::Version) => {
            println!("sindri {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Structured JSON tracing, matching the rest of the workspace's init.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sindri=debug")),
        )
        .json()
        .init();
}

/// Load configuration, searching `./sindri.toml` then `~/.sindri/config.toml`
/// before falling back to defaults (spec §10.3, `original_source/sindri/
/// config.py`'s `SindriConfig.load` search order).
fn load_config() -> anyhow::Result<(Config, String)> {
    let candidates = [
        PathBuf::from("sindri.toml"),
        dirs::home_dir()
            .map(|h| h.join(".sindri").join("config.toml"))
            .unwrap_or_default(),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            let raw = std::fs::read_to_string(candidate)
                .map_err(|e| anyhow::anyhow!("reading {}: {e}", candidate.display()))?;
            let config: Config = toml::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("parsing {}: {e}", candidate.display()))?;
            return Ok((config, candidate.display().to_string()));
        }
    }

    Ok((Config::default(), "<defaults>".to_string()))
}

fn data_dir(config: &Config) -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".sindri"))
        .unwrap_or_else(|| config.workspace.state_path.clone())
}

async fn run_task(config: Config, task: String, agent: String, json: bool) -> anyhow::Result<()> {
    tracing::info!(%agent, "sindri starting");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count()
        );
    }

    let state_dir = data_dir(&config).join("state");
    std::fs::create_dir_all(&state_dir)?;
    let db_path = data_dir(&config).join(&config.sessions.database_path);

    let events = Arc::new(EventBus::new());
    let scheduler = Arc::new(Scheduler::new(events.clone()));
    let mut agents = AgentRegistry::with_defaults();
    for catalog_path in &config.agents.catalog_paths {
        match agents.load_plugin_dir(catalog_path) {
            Ok(n) => tracing::info!(n, path = %catalog_path.display(), "loaded agent catalog"),
            Err(e) => tracing::warn!(path = %catalog_path.display(), error = %e, "failed to load agent catalog"),
        }
    }

    let model = Arc::new(ModelClient::new(&config.llm)?);
    let process_manager = Arc::new(ProcessManager::new(config.tools.exec.clone()));
    let tools = Arc::new(sindri_tools::default_registry(&config.workspace.path, process_manager));
    let sessions = Arc::new(SessionStore::open(&db_path)?);
    let checkpoints = Arc::new(CheckpointStore::new(state_dir.clone())?);
    let models = Arc::new(ModelManager::new(config.vram.clone()));

    let loop_ = IterationLoop::new(
        model,
        tools,
        sessions,
        checkpoints,
        events.clone(),
        scheduler.clone(),
        config.context.clone(),
        config.loop_.clone(),
    );
    let orchestrator = Orchestrator::new(scheduler, agents, loop_, models, events);

    let outcome = orchestrator.run(task, &agent).await?;

    if json {
        println!("{}", serde_json::json!({
            "success": outcome.success,
            "task_id": outcome.task_id,
            "subtasks": outcome.subtasks,
            "result": outcome.result,
            "error": outcome.error,
        }));
    } else if outcome.success {
        println!("{}", outcome.result.unwrap_or_default());
    } else {
        eprintln!("task failed: {}", outcome.error.unwrap_or_default());
        std::process::exit(1);
    }

    Ok(())
}
