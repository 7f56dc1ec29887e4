//! Agent Registry (C7): the read-only mapping from agent name to
//! `AgentDefinition`, seeded with Sindri's default seven-agent catalog and
//! extensible from an on-disk directory of TOML plugin files.

pub mod definition;
pub mod prompts;
pub mod registry;

pub use definition::{AgentCatalogFile, AgentDefinition};
pub use registry::AgentRegistry;
