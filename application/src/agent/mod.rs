//! The escalated evaluation agent.

pub mod runtime;

pub use runtime::{submit_tool_definition, AgentRuntime, SUBMIT_TOOL};
