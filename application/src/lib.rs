//! Application layer: use cases and ports
//!
//! Orchestrates the evaluation pipeline over the domain model. Depends on
//! `atelier-domain` and on ports only; concrete adapters are injected by the
//! infrastructure layer.

pub mod agent;
pub mod config;
pub mod critic;
pub mod orchestrator;
pub mod ports;

pub use agent::{submit_tool_definition, AgentRuntime, SUBMIT_TOOL};
pub use config::{
    AgentConfig, CostConfig, CriticConfig, EscalationMode, HitlConfig, PipelineConfig,
};
pub use critic::{CriticEngine, CritiqueInput, CritiqueOutput, RuleBaseline, RuleEngine};
pub use orchestrator::{
    PipelineError, PipelineHandle, PipelineOrchestrator, RegistryError, RunPhase, RunRegistry,
    SyncEvaluationBridge, EVENT_CHANNEL_CAPACITY,
};
pub use ports::{
    ArchiveError, ArchiveRecord, ArchivistPort, CheckpointError, CheckpointPort, DraftError,
    DraftPort, DraftRequest, GatewayError, ModelGatewayPort, ModelRequest, ModelRouterPort,
    RefineRequest, ScoutError, ScoutPort, ToolChoice, ToolExecutorError, ToolExecutorPort,
};
