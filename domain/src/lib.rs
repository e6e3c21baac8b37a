//! Domain layer for atelier
//!
//! This crate contains the core business logic, entities, and value objects
//! of the evaluation pipeline. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Five-layer evaluation
//!
//! Every candidate work is scored along five layers, from surface to depth:
//! visual form, composition, cultural context, symbolic meaning and
//! philosophical depth. A deterministic rule baseline scores first; layers
//! with low confidence escalate to a tool-using critic agent, and the two
//! scores merge 30/70 in the agent's favor.
//!
//! ## The Queen
//!
//! After critique, a pure decision policy picks one of accept, rerun,
//! rerun_local, downgrade or stop, bounded by a round limit and an image
//! budget. A human can intervene between rounds.

pub mod agent;
pub mod core;
pub mod evaluation;
pub mod pipeline;
pub mod plan;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use agent::{context::AgentContext, result::AgentResult};
pub use core::{
    error::DomainError,
    model::{Model, ModelChoice},
};
pub use evaluation::{
    board::AnalysisBoard,
    layer::Layer,
    layer_state::LayerState,
    score::{
        merge_scores, CandidateScore, DimensionScore, GateConfig, RiskTag, ScoreVector,
        ScoreWeights, Severity,
    },
    signal::{detect_cross_layer_signals, CrossLayerSignal, SignalType},
};
pub use pipeline::{
    candidate::{Candidate, EvidenceItem, EvidencePack, ImageProvider},
    event::PipelineEvent,
    human::HumanAction,
    input::PipelineInput,
    queen::{BudgetStatus, QueenAction, QueenDecision, QueenInput, QueenPolicy},
    stage::{Stage, StageResult, StageStatus},
    tradition::CulturalTradition,
};
pub use plan::{
    evidence::{derive_evidence_request, NeedMoreEvidence, Urgency},
    fixit::{derive_fixit_plan, FixItPlan, FixItem, FixStrategy},
    plan_state::{HumanOverride, PlanState, PlanStateSummary},
};
pub use session::{
    entities::{sniff_image_mime, ImagePayload, Message, Role},
    response::{ContentBlock, ModelResponse, StopReason},
};
pub use tool::entities::{ToolCall, ToolDefinition, ToolParameter, ToolResult, ToolSpec};
