//! Session Store (C4) and Recovery Manager (C11) for the Sindri runtime.
//!
//! Sessions and their turns live in an embedded SQLite database
//! (`store.rs`); per-session checkpoints for crash recovery live as
//! individual JSON files on disk (`checkpoint.rs`).

pub mod checkpoint;
pub mod store;

pub use checkpoint::CheckpointStore;
pub use store::SessionStore;
