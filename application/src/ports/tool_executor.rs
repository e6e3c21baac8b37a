//! Tool executor port
//!
//! The critic agent's tools run behind this port. The toolbox is built per
//! run so it can close over the run's evidence pack and analysis board.

use async_trait::async_trait;
use atelier_domain::{ToolCall, ToolDefinition, ToolResult};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolExecutorError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Executes tool calls requested by the agent.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Definitions of the exploration tools offered to the model. The
    /// terminal `submit_evaluation` tool is defined by the runtime, not here.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Execute one tool call. Argument problems come back as a failed
    /// `ToolResult` so the model can correct itself; only infrastructure
    /// breakage is an `Err`.
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolExecutorError>;
}
