//! Pipeline orchestration
//!
//! Drives one run through `scout -> {draft -> critic -> queen}+ ->
//! [archivist]`, checkpointing every stage, pausing for human review when
//! enabled, and exposing progress as a lazy bounded event stream. Every run
//! ends in exactly one `pipeline_completed` or `pipeline_failed` event.

pub mod bridge;
pub mod run_state;

use crate::config::PipelineConfig;
use crate::critic::{CriticEngine, CritiqueInput, CritiqueOutput};
use crate::ports::{
    ArchiveError, ArchiveRecord, ArchivistPort, CheckpointError, CheckpointPort, DraftError,
    DraftPort, DraftRequest, RefineRequest, ScoutError, ScoutPort,
};
use atelier_domain::{
    BudgetStatus, Candidate, CandidateScore, EvidencePack, HumanAction, ImageProvider, Layer,
    PipelineEvent, PipelineInput, PlanState, QueenAction, QueenDecision, QueenInput, Stage,
    StageResult,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub use bridge::{SyncEvaluationBridge, BRIDGE_TIMEOUT};
pub use run_state::{RegistryError, RunPhase, RunRegistry};

/// Capacity of the per-run event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tolerance on the image budget comparison.
const COST_EPSILON: f64 = 1e-9;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot resume: missing checkpoint for prerequisite stage {0}")]
    MissingPrerequisite(Stage),

    #[error("image budget exceeded: spent {spent:.3} USD of {ceiling:.3} USD ceiling")]
    BudgetExceeded { spent: f64, ceiling: f64 },

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Scout(#[from] ScoutError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Handle to a spawned run: the task id plus its event stream.
///
/// The stream is lazy and non-restartable; dropping the handle abandons the
/// events but not the run.
pub struct PipelineHandle {
    pub task_id: String,
    receiver: mpsc::Receiver<PipelineEvent>,
}

impl PipelineHandle {
    /// Next event, `None` once the run has emitted its terminal event.
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        self.receiver.recv().await
    }

    /// Drain all events and return the terminal one.
    pub async fn run_to_completion(mut self) -> Option<PipelineEvent> {
        let mut terminal = None;
        while let Some(event) = self.receiver.recv().await {
            if event.is_terminal() {
                terminal = Some(event);
            }
        }
        terminal
    }
}

/// The pipeline state machine.
pub struct PipelineOrchestrator {
    scout: Arc<dyn ScoutPort>,
    draft: Arc<dyn DraftPort>,
    critic: Arc<CriticEngine>,
    archivist: Arc<dyn ArchivistPort>,
    checkpoints: Arc<dyn CheckpointPort>,
    registry: Arc<RunRegistry>,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        scout: Arc<dyn ScoutPort>,
        draft: Arc<dyn DraftPort>,
        critic: Arc<CriticEngine>,
        archivist: Arc<dyn ArchivistPort>,
        checkpoints: Arc<dyn CheckpointPort>,
        registry: Arc<RunRegistry>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            scout,
            draft,
            critic,
            archivist,
            checkpoints,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> Arc<RunRegistry> {
        Arc::clone(&self.registry)
    }

    /// Deliver a human action to a paused run.
    pub fn submit_action(&self, task_id: &str, action: HumanAction) -> bool {
        self.registry.submit_action(task_id, action)
    }

    /// Spawn a run and return its event stream handle.
    pub fn run(self: &Arc<Self>, input: PipelineInput) -> PipelineHandle {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let orchestrator = Arc::clone(self);
        let task_id = input.task_id.clone();

        tokio::spawn(async move {
            let started = Instant::now();
            let mut stages_completed: Vec<Stage> = Vec::new();
            orchestrator.registry.register(&input.task_id);

            match orchestrator
                .execute(&input, &tx, started, &mut stages_completed)
                .await
            {
                Ok(()) => {
                    orchestrator
                        .registry
                        .set_phase(&input.task_id, RunPhase::Completed);
                }
                Err(err) => {
                    error!(task = %input.task_id, error = %err, "pipeline failed");
                    orchestrator
                        .registry
                        .set_phase(&input.task_id, RunPhase::Failed);
                    let entry = json!({
                        "task_id": input.task_id,
                        "status": "failed",
                        "error": err.to_string(),
                        "updated_at": chrono::Utc::now().to_rfc3339(),
                    });
                    if let Err(index_err) = orchestrator
                        .checkpoints
                        .update_index(&input.task_id, &entry)
                        .await
                    {
                        warn!(error = %index_err, "failed to record failure in index");
                    }
                    emit(
                        &tx,
                        PipelineEvent::PipelineFailed {
                            error: err.to_string(),
                            stages_completed: stages_completed.clone(),
                            elapsed_ms: started.elapsed().as_millis() as u64,
                        },
                    )
                    .await;
                }
            }
        });

        PipelineHandle { task_id, receiver: rx }
    }

    async fn execute(
        &self,
        input: &PipelineInput,
        tx: &mpsc::Sender<PipelineEvent>,
        started: Instant,
        stages_completed: &mut Vec<Stage>,
    ) -> Result<(), PipelineError> {
        input
            .validate()
            .map_err(|e| PipelineError::InvalidInput(e.to_string()))?;

        if let Some(stage) = input.resume_from {
            for prerequisite in stage.prerequisites() {
                if self
                    .checkpoints
                    .load_stage(&input.task_id, *prerequisite)
                    .await?
                    .is_none()
                {
                    return Err(PipelineError::MissingPrerequisite(*prerequisite));
                }
            }
        }

        let task = input.task_id.as_str();
        let resume = input.resume_from;
        let elapsed = || started.elapsed().as_millis() as u64;

        // Scout: gather or restore the evidence pack.
        let mut evidence: EvidencePack = if restored(resume, Stage::Scout) {
            let doc = self.load_required(task, Stage::Scout).await?;
            let pack = decode_field(Stage::Scout, &doc, "evidence")?;
            stages_completed.push(Stage::Scout);
            emit(tx, stage_restored(Stage::Scout, 1, elapsed())).await;
            pack
        } else {
            emit(
                tx,
                PipelineEvent::StageStarted {
                    stage: Stage::Scout,
                    round: 1,
                    elapsed_ms: elapsed(),
                },
            )
            .await;
            let stage_start = Instant::now();
            let pack = self
                .scout
                .gather_evidence(&input.subject, input.tradition, &[])
                .await?;
            self.checkpoints
                .save_stage(task, Stage::Scout, &json!({ "evidence": &pack }))
                .await?;
            stages_completed.push(Stage::Scout);
            emit(
                tx,
                PipelineEvent::StageCompleted {
                    stage: Stage::Scout,
                    round: 1,
                    latency_ms: stage_start.elapsed().as_millis() as u64,
                    summary: pack.summary(),
                    elapsed_ms: elapsed(),
                },
            )
            .await;
            pack
        };

        // Mid-pipeline restores for resume targets past draft/critic/queen.
        let mut plan = PlanState::new();
        let mut round: u32 = 1;
        let mut image_spent = 0.0f64;
        let mut llm_spent = 0.0f64;
        let mut previous_best: Option<CandidateScore> = None;
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut prompt_hints: Vec<String> = Vec::new();
        let mut pending_refine: Option<RefineRequest> = None;
        let mut restored_candidates: Option<Vec<Candidate>> = None;
        let mut restored_critique: Option<CritiqueOutput> = None;
        let mut restored_decision: Option<QueenDecision> = None;

        if restored(resume, Stage::Draft) {
            let doc = self.load_required(task, Stage::Draft).await?;
            round = decode_field(Stage::Draft, &doc, "round")?;
            image_spent = decode_field(Stage::Draft, &doc, "image_spent_usd")?;
            restored_candidates = Some(decode_field(Stage::Draft, &doc, "candidates")?);
            stages_completed.push(Stage::Draft);
            emit(tx, stage_restored(Stage::Draft, round, elapsed())).await;
        }
        if restored(resume, Stage::Critic) {
            let doc = self.load_required(task, Stage::Critic).await?;
            plan = decode_field(Stage::Critic, &doc, "plan")?;
            restored_critique = Some(decode_field(Stage::Critic, &doc, "critique")?);
            stages_completed.push(Stage::Critic);
            emit(tx, stage_restored(Stage::Critic, round, elapsed())).await;
        }
        if restored(resume, Stage::Queen) {
            let doc = self.load_required(task, Stage::Queen).await?;
            restored_decision = Some(decode_field(Stage::Queen, &doc, "decision")?);
            stages_completed.push(Stage::Queen);
            emit(tx, stage_restored(Stage::Queen, round, elapsed())).await;
        }

        let ceiling = self.config.cost.image_ceiling_usd;
        let per_image = |provider: ImageProvider| {
            self.config
                .cost
                .cost_per_image
                .unwrap_or_else(|| provider.default_cost_per_image())
        };

        let (final_decision, final_critique) = loop {
            // Draft: restore, refine one candidate, or generate a batch.
            if let Some(batch) = restored_candidates.take() {
                candidates = batch;
            } else {
                emit(
                    tx,
                    PipelineEvent::StageStarted {
                        stage: Stage::Draft,
                        round,
                        elapsed_ms: elapsed(),
                    },
                )
                .await;
                let stage_start = Instant::now();
                let summary;
                if let Some(request) = pending_refine.take() {
                    let refined = self.draft.refine(&request).await?;
                    image_spent += per_image(refined.provider);
                    summary = format!("refined {} into {}", request.candidate.id, refined.id);
                    candidates = vec![refined];
                } else {
                    let request = DraftRequest {
                        subject: input.subject.clone(),
                        tradition: input.tradition,
                        count: self.config.candidates_per_round,
                        seed_base: self.config.seed_base + (round as u64 - 1) * 100,
                        prompt_hints: prompt_hints.clone(),
                    };
                    candidates = self.draft.generate(&request).await?;
                    for candidate in &candidates {
                        image_spent += per_image(candidate.provider);
                    }
                    summary = format!("{} candidates generated", candidates.len());
                }
                self.checkpoints
                    .save_stage(
                        task,
                        Stage::Draft,
                        &json!({
                            "round": round,
                            "candidates": &candidates,
                            "image_spent_usd": image_spent,
                        }),
                    )
                    .await?;
                stages_completed.push(Stage::Draft);
                emit(
                    tx,
                    PipelineEvent::StageCompleted {
                        stage: Stage::Draft,
                        round,
                        latency_ms: stage_start.elapsed().as_millis() as u64,
                        summary,
                        elapsed_ms: elapsed(),
                    },
                )
                .await;
                if image_spent >= ceiling - COST_EPSILON {
                    return Err(PipelineError::BudgetExceeded {
                        spent: image_spent,
                        ceiling,
                    });
                }
            }

            // Critic: score, escalate, merge, gate.
            let critique = if let Some(critique) = restored_critique.take() {
                critique
            } else {
                emit(
                    tx,
                    PipelineEvent::StageStarted {
                        stage: Stage::Critic,
                        round,
                        elapsed_ms: elapsed(),
                    },
                )
                .await;
                let stage_start = Instant::now();
                let critique_input = CritiqueInput {
                    task_id: input.task_id.clone(),
                    subject: input.subject.clone(),
                    tradition: input.tradition,
                    candidates: candidates.clone(),
                    evidence: evidence.clone(),
                    round,
                    previous_best: previous_best.clone(),
                };
                let output = self.critic.run(&critique_input, &mut plan).await;
                llm_spent += output.llm_cost_usd;
                self.checkpoints
                    .save_stage(
                        task,
                        Stage::Critic,
                        &json!({
                            "round": round,
                            "critique": &output,
                            "plan": &plan,
                        }),
                    )
                    .await?;
                stages_completed.push(Stage::Critic);
                emit(
                    tx,
                    PipelineEvent::StageCompleted {
                        stage: Stage::Critic,
                        round,
                        latency_ms: stage_start.elapsed().as_millis() as u64,
                        summary: format!(
                            "{} candidates retained, gate {}",
                            output.scores.len(),
                            if output.best.is_some() { "passed" } else { "failed" }
                        ),
                        elapsed_ms: elapsed(),
                    },
                )
                .await;
                output
            };
            previous_best = critique.scores.first().cloned();

            // Queen: pure decision over the critique.
            let mut decision = if let Some(decision) = restored_decision.take() {
                decision
            } else {
                emit(
                    tx,
                    PipelineEvent::StageStarted {
                        stage: Stage::Queen,
                        round,
                        elapsed_ms: elapsed(),
                    },
                )
                .await;
                let next_provider = candidates
                    .first()
                    .map(|c| c.provider)
                    .unwrap_or(ImageProvider::Gemini);
                let pending = plan.pending_rerun_dimensions();
                let queen_input = QueenInput {
                    // The top-ranked candidate; decide() checks the gate itself
                    // so the downgrade path can see a near-miss total.
                    best: critique.scores.first(),
                    fixit_plan: critique.fixit_plan.as_ref(),
                    rerun_hint: &critique.rerun_hint,
                    pending_rerun: &pending,
                    tradition: input.tradition,
                    round,
                    budget: BudgetStatus {
                        image_spent_usd: image_spent,
                        image_ceiling_usd: ceiling,
                        next_round_cost_usd: self.config.candidates_per_round as f64
                            * per_image(next_provider),
                    },
                };
                let decision = self.config.queen.decide(&queen_input);
                self.checkpoints
                    .save_stage(
                        task,
                        Stage::Queen,
                        &json!({ "round": round, "decision": &decision }),
                    )
                    .await?;
                stages_completed.push(Stage::Queen);
                emit(
                    tx,
                    PipelineEvent::StageCompleted {
                        stage: Stage::Queen,
                        round,
                        latency_ms: 0,
                        summary: format!("{}: {}", decision.action, decision.reason),
                        elapsed_ms: elapsed(),
                    },
                )
                .await;
                emit(tx, PipelineEvent::decision_made(&decision, round, elapsed())).await;
                decision
            };

            // Human review window.
            if self.config.hitl.enabled {
                emit(
                    tx,
                    PipelineEvent::HumanRequired {
                        decision: decision.action,
                        reason: decision.reason.clone(),
                        plan: plan.summary(),
                        elapsed_ms: elapsed(),
                    },
                )
                .await;
                match self
                    .registry
                    .wait_for_action(task, Duration::from_secs(self.config.hitl.timeout_secs))
                    .await
                {
                    Ok(Some(action)) => {
                        emit(
                            tx,
                            PipelineEvent::HumanReceived {
                                action: action.clone(),
                                elapsed_ms: elapsed(),
                            },
                        )
                        .await;
                        plan.record_override(round, &action);
                        decision = apply_human_action(decision, &action, &critique);
                    }
                    // Timeout proceeds silently with the original decision.
                    Ok(None) => {}
                    Err(err) => warn!(error = %err, "human wait failed, proceeding"),
                }
            }

            match decision.action {
                QueenAction::Accept | QueenAction::Downgrade | QueenAction::Stop => {
                    break (decision, critique);
                }
                QueenAction::Rerun => {
                    prompt_hints = rerun_prompt_hints(&decision, &critique);
                    if let Some(request) = &critique.evidence_request {
                        match self
                            .scout
                            .gather_evidence(
                                &input.subject,
                                input.tradition,
                                &request.suggested_queries,
                            )
                            .await
                        {
                            Ok(pack) => {
                                info!(coverage = pack.coverage, "supplementary evidence gathered");
                                evidence = pack;
                            }
                            Err(err) => {
                                warn!(error = %err, "supplementary evidence gathering failed")
                            }
                        }
                    }
                    round += 1;
                }
                QueenAction::RerunLocal => {
                    let target = decision
                        .candidate_id
                        .as_ref()
                        .and_then(|id| candidates.iter().find(|c| &c.id == id))
                        .or_else(|| candidates.first())
                        .cloned();
                    match target {
                        Some(candidate) => {
                            pending_refine =
                                Some(build_refine_request(candidate, &decision, &critique, &plan));
                        }
                        // No candidate in hand: only a fresh batch can help.
                        None => {
                            warn!("local rerun with no candidate, drafting a fresh batch");
                            prompt_hints = rerun_prompt_hints(&decision, &critique);
                        }
                    }
                    round += 1;
                }
            }
        };

        // Archivist: persist accepted or downgraded outcomes.
        let best_candidate_id = final_decision.candidate_id.clone();
        if matches!(
            final_decision.action,
            QueenAction::Accept | QueenAction::Downgrade
        ) {
            emit(
                tx,
                PipelineEvent::StageStarted {
                    stage: Stage::Archivist,
                    round,
                    elapsed_ms: elapsed(),
                },
            )
            .await;
            let stage_start = Instant::now();
            let best_candidate = best_candidate_id
                .as_ref()
                .and_then(|id| candidates.iter().find(|c| &c.id == id))
                .cloned();
            let best_score = best_candidate_id
                .as_ref()
                .and_then(|id| final_critique.scores.iter().find(|s| &s.candidate_id == id))
                .cloned();
            let record = ArchiveRecord {
                task_id: input.task_id.clone(),
                decision: final_decision.clone(),
                best_candidate,
                best_score,
                total_rounds: round,
                total_cost_usd: image_spent + llm_spent,
                archived_at: chrono::Utc::now(),
            };
            let location = self.archivist.archive(&record).await?;
            self.checkpoints
                .save_stage(
                    task,
                    Stage::Archivist,
                    &json!({ "location": location, "record": &record }),
                )
                .await?;
            stages_completed.push(Stage::Archivist);
            emit(
                tx,
                PipelineEvent::StageCompleted {
                    stage: Stage::Archivist,
                    round,
                    latency_ms: stage_start.elapsed().as_millis() as u64,
                    summary: format!("archived to {location}"),
                    elapsed_ms: elapsed(),
                },
            )
            .await;
        }

        let total_cost_usd = image_spent + llm_spent;
        self.checkpoints
            .save_output(
                task,
                &json!({
                    "task_id": input.task_id,
                    "decision": &final_decision,
                    "best_candidate_id": &best_candidate_id,
                    "total_rounds": round,
                    "total_cost_usd": total_cost_usd,
                }),
            )
            .await?;
        self.checkpoints
            .update_index(
                task,
                &json!({
                    "task_id": input.task_id,
                    "status": "completed",
                    "decision": final_decision.action.as_str(),
                    "updated_at": chrono::Utc::now().to_rfc3339(),
                }),
            )
            .await?;

        emit(
            tx,
            PipelineEvent::PipelineCompleted {
                final_decision: final_decision.action,
                best_candidate_id,
                total_rounds: round,
                total_latency_ms: elapsed(),
                total_cost_usd,
            },
        )
        .await;
        Ok(())
    }

    async fn load_required(
        &self,
        task: &str,
        stage: Stage,
    ) -> Result<serde_json::Value, PipelineError> {
        self.checkpoints
            .load_stage(task, stage)
            .await?
            .ok_or(PipelineError::Checkpoint(CheckpointError::Missing(stage)))
    }
}

/// Stages strictly before the resume target are loaded, not executed.
fn restored(resume: Option<Stage>, stage: Stage) -> bool {
    matches!(resume, Some(target) if stage < target)
}

fn stage_restored(stage: Stage, round: u32, elapsed_ms: u64) -> PipelineEvent {
    PipelineEvent::StageSkipped {
        result: StageResult::skipped(stage, "restored from checkpoint"),
        round,
        elapsed_ms,
    }
}

async fn emit(tx: &mpsc::Sender<PipelineEvent>, event: PipelineEvent) {
    // A dropped consumer abandons the stream, not the run.
    let _ = tx.send(event).await;
}

fn decode_field<T: serde::de::DeserializeOwned>(
    stage: Stage,
    doc: &serde_json::Value,
    field: &str,
) -> Result<T, PipelineError> {
    serde_json::from_value(doc[field].clone()).map_err(|err| {
        PipelineError::Checkpoint(CheckpointError::Corrupt {
            stage,
            message: format!("field '{field}': {err}"),
        })
    })
}

/// Fold a human action into the queen's decision.
fn apply_human_action(
    decision: QueenDecision,
    action: &HumanAction,
    critique: &CritiqueOutput,
) -> QueenDecision {
    match action {
        HumanAction::Approve | HumanAction::LockDimensions { .. } => decision,
        HumanAction::Reject { reason } => QueenDecision {
            action: QueenAction::Stop,
            reason: match reason {
                Some(text) => format!("rejected by human: {text}"),
                None => "rejected by human".to_string(),
            },
            rerun_dimensions: Vec::new(),
            candidate_id: None,
        },
        HumanAction::Rerun { rerun_dimensions } => QueenDecision {
            action: QueenAction::Rerun,
            reason: "rerun requested by human".to_string(),
            rerun_dimensions: rerun_dimensions.clone(),
            candidate_id: None,
        },
        HumanAction::ForceAccept { candidate_id } => {
            let chosen = candidate_id
                .clone()
                .or_else(|| critique.best.as_ref().map(|b| b.candidate_id.clone()))
                .or_else(|| critique.scores.first().map(|s| s.candidate_id.clone()));
            QueenDecision {
                action: QueenAction::Accept,
                reason: "force-accepted by human".to_string(),
                rerun_dimensions: Vec::new(),
                candidate_id: chosen,
            }
        }
    }
}

/// Assemble the single-candidate refinement for a local rerun.
///
/// Targets come from the fix-it plan when the critic produced one; without a
/// plan they fall back to the decision's dimensions, then to the rerun hint,
/// so a planless local rerun still refines one candidate instead of
/// regenerating a batch. Locked dimensions are always preserved.
fn build_refine_request(
    candidate: Candidate,
    decision: &QueenDecision,
    critique: &CritiqueOutput,
    plan: &PlanState,
) -> RefineRequest {
    let fixit_plan = critique.fixit_plan.clone();
    let mut target_layers: Vec<Layer> = fixit_plan
        .as_ref()
        .map(|f| f.target_layers())
        .unwrap_or_default();
    if target_layers.is_empty() {
        target_layers = decision.rerun_dimensions.clone();
    }
    if target_layers.is_empty() {
        target_layers = critique.rerun_hint.clone();
    }
    RefineRequest {
        candidate,
        fixit_plan,
        target_layers,
        preserve_layers: plan.locked_dimensions(),
    }
}

/// Prompt guidance for the next draft round, preferring concrete fix deltas.
fn rerun_prompt_hints(decision: &QueenDecision, critique: &CritiqueOutput) -> Vec<String> {
    let mut hints = Vec::new();
    if let Some(fix) = &critique.fixit_plan {
        for item in &fix.items {
            if decision.rerun_dimensions.contains(&item.layer) {
                hints.push(item.prompt_delta.clone());
            }
        }
    }
    if hints.is_empty() {
        for layer in &decision.rerun_dimensions {
            hints.push(format!(
                "strengthen the {} dimension",
                layer.display_name().to_lowercase()
            ));
        }
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_domain::Layer;

    fn empty_critique() -> CritiqueOutput {
        CritiqueOutput {
            scores: Vec::new(),
            best: None,
            rerun_hint: Vec::new(),
            fixit_plan: None,
            evidence_request: None,
            replan_count: 0,
            escalations: 0,
            llm_cost_usd: 0.0,
        }
    }

    fn accept_decision() -> QueenDecision {
        QueenDecision {
            action: QueenAction::Accept,
            reason: "gate passed".to_string(),
            rerun_dimensions: Vec::new(),
            candidate_id: Some("cand-1".to_string()),
        }
    }

    #[test]
    fn test_restored_is_strictly_before_target() {
        assert!(restored(Some(Stage::Critic), Stage::Scout));
        assert!(restored(Some(Stage::Critic), Stage::Draft));
        assert!(!restored(Some(Stage::Critic), Stage::Critic));
        assert!(!restored(None, Stage::Scout));
    }

    #[test]
    fn test_human_reject_overrides_accept() {
        let overridden = apply_human_action(
            accept_decision(),
            &HumanAction::Reject {
                reason: Some("not good enough".to_string()),
            },
            &empty_critique(),
        );
        assert_eq!(overridden.action, QueenAction::Stop);
        assert!(overridden.reason.contains("not good enough"));
    }

    #[test]
    fn test_human_approve_keeps_decision() {
        let kept = apply_human_action(accept_decision(), &HumanAction::Approve, &empty_critique());
        assert_eq!(kept.action, QueenAction::Accept);
        assert_eq!(kept.candidate_id.as_deref(), Some("cand-1"));
    }

    #[test]
    fn test_force_accept_picks_named_candidate() {
        let forced = apply_human_action(
            QueenDecision {
                action: QueenAction::Stop,
                reason: "limit".to_string(),
                rerun_dimensions: Vec::new(),
                candidate_id: None,
            },
            &HumanAction::ForceAccept {
                candidate_id: Some("cand-9".to_string()),
            },
            &empty_critique(),
        );
        assert_eq!(forced.action, QueenAction::Accept);
        assert_eq!(forced.candidate_id.as_deref(), Some("cand-9"));
    }

    #[test]
    fn test_refine_request_prefers_plan_targets() {
        let mut critique = empty_critique();
        critique.fixit_plan = atelier_domain::derive_fixit_plan(
            &atelier_domain::ScoreVector::new([0.9, 0.9, 0.2, 0.9, 0.9]),
        );
        let decision = QueenDecision {
            action: QueenAction::RerunLocal,
            reason: "fixable".to_string(),
            rerun_dimensions: vec![Layer::Composition],
            candidate_id: Some("cand-1".to_string()),
        };
        let request = build_refine_request(
            Candidate::new("cand-1", "heron", 7),
            &decision,
            &critique,
            &PlanState::new(),
        );
        assert!(request.fixit_plan.is_some());
        assert_eq!(request.target_layers, vec![Layer::CulturalContext]);
    }

    #[test]
    fn test_refine_request_without_plan_targets_decision_dimensions() {
        // A local rerun with no stored plan must still refine exactly one
        // candidate, guided by the decision's dimensions.
        let mut plan = PlanState::new();
        plan.lock_dimensions([Layer::VisualForm]);
        let decision = QueenDecision {
            action: QueenAction::RerunLocal,
            reason: "human asked".to_string(),
            rerun_dimensions: vec![Layer::CulturalContext],
            candidate_id: Some("cand-1".to_string()),
        };
        let request = build_refine_request(
            Candidate::new("cand-1", "heron", 7),
            &decision,
            &empty_critique(),
            &plan,
        );
        assert!(request.fixit_plan.is_none());
        assert_eq!(request.target_layers, vec![Layer::CulturalContext]);
        assert_eq!(request.preserve_layers, vec![Layer::VisualForm]);
    }

    #[test]
    fn test_rerun_hints_prefer_fix_deltas() {
        let mut critique = empty_critique();
        critique.fixit_plan = atelier_domain::derive_fixit_plan(
            &atelier_domain::ScoreVector::new([0.9, 0.9, 0.2, 0.9, 0.9]),
        );
        let decision = QueenDecision {
            action: QueenAction::Rerun,
            reason: "weak grounding".to_string(),
            rerun_dimensions: vec![Layer::CulturalContext],
            candidate_id: None,
        };
        let hints = rerun_prompt_hints(&decision, &critique);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("canonical motifs"));

        let bare = rerun_prompt_hints(&decision, &empty_critique());
        assert!(bare[0].contains("cultural context"));
    }
}
