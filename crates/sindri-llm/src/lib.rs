//! Model Client (spec §4.1): talks to a single local, Ollama-compatible
//! model runtime. No multi-provider routing — agents select a model by
//! name from the runtime's own catalog.

pub mod client;
pub mod models;
pub(crate) mod ndjson;
pub(crate) mod wire;

pub use client::{ChatResponse, ModelClient};
pub use models::{default_models, ModelSize};
