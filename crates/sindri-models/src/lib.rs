//! VRAM Model Manager (C6): admits and evicts models against a fixed
//! VRAM budget so concurrently-running agents never oversubscribe the
//! host's GPU memory.

pub mod manager;

pub use manager::{ModelManager, ModelStats};
