//! Context assembly (spec §4.8 step 1): builds the message list for one
//! iteration from an agent's system prompt, optional memory-system
//! injections, and the session's stored turns, under a character budget.

pub mod builder;
pub mod injection;
pub mod report;
pub mod truncation;

pub use builder::{ContextBuilder, OptionalSections};
pub use report::{ContextReport, SectionReport};
