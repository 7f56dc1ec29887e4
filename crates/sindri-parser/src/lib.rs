//! Tool-Call Parser / Streaming Buffer (spec §4.3): recovers tool calls
//! from free-text model output and tracks brace depth across a token
//! stream so callers can hide a tool-call wrapper while it's mid-flight.

pub mod calls;
pub mod streaming;

pub use calls::{ParsedToolCall, ToolCallParser};
pub use streaming::StreamingBuffer;
