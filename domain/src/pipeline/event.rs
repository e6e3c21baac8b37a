//! Pipeline progress events
//!
//! Emitted in order over a bounded channel while a run executes. Consumers
//! (CLI printer, event log) observe the run without touching its state.

use super::human::HumanAction;
use super::queen::{QueenAction, QueenDecision};
use super::stage::{Stage, StageResult};
use crate::evaluation::layer::Layer;
use crate::plan::plan_state::PlanStateSummary;
use serde::{Deserialize, Serialize};

/// One observable moment in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted {
        stage: Stage,
        round: u32,
        elapsed_ms: u64,
    },
    StageCompleted {
        stage: Stage,
        round: u32,
        latency_ms: u64,
        summary: String,
        elapsed_ms: u64,
    },
    /// A stage whose output was loaded from a checkpoint instead of
    /// executed; the embedded result carries the skipped status.
    StageSkipped {
        #[serde(flatten)]
        result: StageResult,
        round: u32,
        elapsed_ms: u64,
    },
    DecisionMade {
        action: QueenAction,
        reason: String,
        rerun_dimensions: Vec<Layer>,
        round: u32,
        elapsed_ms: u64,
    },
    /// The run is parked waiting for a human verdict.
    HumanRequired {
        decision: QueenAction,
        reason: String,
        plan: PlanStateSummary,
        elapsed_ms: u64,
    },
    HumanReceived {
        action: HumanAction,
        elapsed_ms: u64,
    },
    /// Terminal success. `total_latency_ms` is measured from run start,
    /// so it doubles as this event's run-relative elapsed time.
    PipelineCompleted {
        final_decision: QueenAction,
        best_candidate_id: Option<String>,
        total_rounds: u32,
        total_latency_ms: u64,
        total_cost_usd: f64,
    },
    PipelineFailed {
        error: String,
        stages_completed: Vec<Stage>,
        elapsed_ms: u64,
    },
}

impl PipelineEvent {
    pub fn kind(&self) -> &str {
        match self {
            PipelineEvent::StageStarted { .. } => "stage_started",
            PipelineEvent::StageCompleted { .. } => "stage_completed",
            PipelineEvent::StageSkipped { .. } => "stage_skipped",
            PipelineEvent::DecisionMade { .. } => "decision_made",
            PipelineEvent::HumanRequired { .. } => "human_required",
            PipelineEvent::HumanReceived { .. } => "human_received",
            PipelineEvent::PipelineCompleted { .. } => "pipeline_completed",
            PipelineEvent::PipelineFailed { .. } => "pipeline_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineEvent::PipelineCompleted { .. } | PipelineEvent::PipelineFailed { .. }
        )
    }

    pub fn decision_made(decision: &QueenDecision, round: u32, elapsed_ms: u64) -> Self {
        PipelineEvent::DecisionMade {
            action: decision.action,
            reason: decision.reason.clone(),
            rerun_dimensions: decision.rerun_dimensions.clone(),
            round,
            elapsed_ms,
        }
    }
}
