//! Critic stage: rule baseline plus selective agent escalation
//!
//! Every candidate is first scored by the deterministic rule baseline, then
//! low-confidence layers are escalated to the tool-using agent and the two
//! scores merged 30/70 in the agent's favor. The merged vectors drive signal
//! detection, gating, ranking and repair planning.

use crate::agent::AgentRuntime;
use crate::config::{CriticConfig, EscalationMode};
use crate::critic::rule_engine::RuleEngine;
use atelier_domain::{
    derive_evidence_request, derive_fixit_plan, detect_cross_layer_signals, merge_scores,
    AgentContext, AnalysisBoard, Candidate, CandidateScore, CulturalTradition, DimensionScore,
    EvidencePack, FixItPlan, GateConfig, Layer, NeedMoreEvidence, PlanState, ScoreWeights,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// A merged dimension below this lands in the rerun hint.
pub const RERUN_HINT_SCORE: f64 = 0.3;

/// Escalation priority: uncertain layers with heavy weights go first.
fn escalation_priority(confidence: f64, weight: f64) -> f64 {
    (1.0 - confidence) * (0.5 + weight)
}

/// Everything the critic stage needs for one round.
#[derive(Debug, Clone)]
pub struct CritiqueInput {
    pub task_id: String,
    pub subject: String,
    pub tradition: CulturalTradition,
    pub candidates: Vec<Candidate>,
    pub evidence: EvidencePack,
    pub round: u32,
    /// Best scored candidate of the previous round, for human-locked
    /// dimension carry-forward.
    pub previous_best: Option<CandidateScore>,
}

/// Outcome of one critic pass. Serialized wholesale into the critic stage
/// checkpoint.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CritiqueOutput {
    /// Retained candidates, best first (stable order, truncated to top_k).
    pub scores: Vec<CandidateScore>,
    /// First gate-passed candidate, if any.
    pub best: Option<CandidateScore>,
    /// Layers scoring below [`RERUN_HINT_SCORE`] across retained candidates.
    pub rerun_hint: Vec<Layer>,
    pub fixit_plan: Option<FixItPlan>,
    pub evidence_request: Option<NeedMoreEvidence>,
    /// Merges that moved a score enough to count as a re-plan.
    pub replan_count: u32,
    /// Agent escalations actually performed.
    pub escalations: u32,
    pub llm_cost_usd: f64,
}

/// The critic stage engine.
pub struct CriticEngine {
    agent: Option<Arc<AgentRuntime>>,
    config: CriticConfig,
    weights: ScoreWeights,
    gate: GateConfig,
    board: AnalysisBoard,
}

impl CriticEngine {
    pub fn new(
        agent: Option<Arc<AgentRuntime>>,
        config: CriticConfig,
        weights: ScoreWeights,
        gate: GateConfig,
    ) -> Self {
        Self {
            agent,
            config,
            weights,
            gate,
            board: AnalysisBoard::new(),
        }
    }

    /// Share the analysis board with the agent's toolbox so the
    /// `read_layer_analysis` tool sees what earlier escalations published.
    pub fn with_board(mut self, board: AnalysisBoard) -> Self {
        self.board = board;
        self
    }

    /// Score, escalate, merge, gate and rank one round of candidates.
    #[tracing::instrument(skip_all, fields(task = %input.task_id, round = input.round))]
    pub async fn run(&self, input: &CritiqueInput, plan: &mut PlanState) -> CritiqueOutput {
        let mut scores: Vec<CandidateScore> = Vec::with_capacity(input.candidates.len());
        let mut replan_count = 0u32;
        let mut escalations = 0u32;
        let mut llm_cost_usd = 0.0f64;

        for candidate in &input.candidates {
            let (score, replans, escalated, cost) =
                self.score_candidate(candidate, input, plan).await;
            replan_count += replans;
            escalations += escalated;
            llm_cost_usd += cost;
            scores.push(score);
        }

        // Stable sort keeps input order among equal totals.
        scores.sort_by(|a, b| {
            b.weighted_total()
                .partial_cmp(&a.weighted_total())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scores.truncate(self.config.top_k);

        if let Some(top) = scores.first() {
            let signals = detect_cross_layer_signals(&top.score_vector());
            if !signals.is_empty() {
                debug!(count = signals.len(), "cross-layer signals detected");
            }
            plan.append_signals(signals);
        }

        let best = scores.iter().find(|s| s.gate_passed).cloned();

        let rerun_hint: Vec<Layer> = scores
            .iter()
            .flat_map(|s| s.score_vector().layers_below(RERUN_HINT_SCORE))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let plan_source = best.as_ref().or_else(|| scores.first());
        let fixit_plan = plan_source.and_then(|s| derive_fixit_plan(&s.score_vector()));
        let evidence_request = plan_source.and_then(|s| {
            derive_evidence_request(
                &s.score_vector(),
                input.evidence.coverage,
                &input.subject,
                &input.tradition,
            )
        });

        info!(
            retained = scores.len(),
            gate_passed = best.is_some(),
            escalations,
            "critique complete"
        );

        CritiqueOutput {
            scores,
            best,
            rerun_hint,
            fixit_plan,
            evidence_request,
            replan_count,
            escalations,
            llm_cost_usd,
        }
    }

    async fn score_candidate(
        &self,
        candidate: &Candidate,
        input: &CritiqueInput,
        plan: &PlanState,
    ) -> (CandidateScore, u32, u32, f64) {
        let baseline = RuleEngine::assess(candidate, &input.evidence, input.tradition);
        let mut states = baseline.states;
        let rule_scores: Vec<f64> = states.iter().map(|s| s.score).collect();
        let board = self.board.clone();

        let mut replans = 0u32;
        let mut escalated = 0u32;
        let mut cost = 0.0f64;
        let mut merged: Vec<(f64, String)> = states
            .iter()
            .map(|s| (s.score, s.analysis_text()))
            .collect();

        if let Some(agent) = &self.agent {
            let targets = self.escalation_targets(&states, plan);
            for layer in targets {
                let mut context = AgentContext::new(&input.task_id, &candidate.id, layer)
                    .with_candidate_summary(candidate.summary())
                    .with_evidence_summary(input.evidence.summary())
                    .with_locked_layers(plan.locked_dimensions());
                if let Some(asset) = &candidate.asset_ref {
                    context = context.with_image_ref(asset.clone());
                }
                if self.config.mode == EscalationMode::Progressive {
                    context = context.with_prior_analyses(board.completed_before(layer));
                }

                let state = &mut states[layer.index()];
                let result = agent.evaluate_with_state(&context, state).await;
                escalated += 1;
                cost += result.cost_usd;

                let rule = rule_scores[layer.index()];
                let (value, replanned) =
                    merge_scores(rule, result.score, result.fallback_used);
                if replanned {
                    replans += 1;
                }
                let rationale = if result.fallback_used {
                    merged[layer.index()].1.clone()
                } else {
                    result.rationale.clone()
                };
                merged[layer.index()] = (value, rationale);
                board.record(layer, state.analysis_text());
            }
        }

        let dimensions: Vec<DimensionScore> = Layer::ALL
            .iter()
            .map(|layer| {
                let (value, rationale) = &merged[layer.index()];
                DimensionScore::new(*layer, *value, rationale.clone())
            })
            .collect();

        let mut score = CandidateScore::new(&candidate.id, dimensions, &self.weights);
        score.risk_tags = baseline.risk_tags;

        // Human-locked dimensions are carried forward verbatim from the
        // previous round before the gate is applied.
        if let Some(previous) = &input.previous_best {
            for layer in plan.locked_dimensions() {
                if let Some(dim) = previous.dimension(layer) {
                    score.replace_dimension(
                        layer,
                        dim.score(),
                        format!("{} (hitl_preserved)", dim.rationale),
                        &self.weights,
                    );
                }
            }
        }

        score.apply_gate(&self.gate);
        (score, replans, escalated, cost)
    }

    /// Layers worth an agent call for this candidate, in execution order.
    fn escalation_targets(&self, states: &[atelier_domain::LayerState], plan: &PlanState) -> Vec<Layer> {
        let unlocked: Vec<&atelier_domain::LayerState> = states
            .iter()
            .filter(|s| !plan.is_locked(s.layer))
            .collect();

        match self.config.mode {
            EscalationMode::Progressive => unlocked
                .iter()
                .map(|s| s.layer)
                .take(self.config.max_escalations)
                .collect(),
            EscalationMode::Parallel => {
                let mut ranked: Vec<(Layer, f64)> = unlocked
                    .iter()
                    .map(|s| {
                        (
                            s.layer,
                            escalation_priority(s.confidence, self.weights.get(s.layer)),
                        )
                    })
                    .filter(|(_, p)| *p >= self.config.min_priority)
                    .collect();
                ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                ranked.truncate(self.config.max_escalations);
                // Execute in layer order regardless of rank.
                let mut layers: Vec<Layer> = ranked.into_iter().map(|(l, _)| l).collect();
                layers.sort_by_key(|l| l.index());
                layers
            }
        }
    }
}
