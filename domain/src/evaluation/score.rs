//! Dimension and candidate scores, the gate, and rule/agent merging

use super::layer::Layer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight of the rule baseline when merging with an agent score.
pub const RULE_MERGE_WEIGHT: f64 = 0.3;
/// Weight of the agent score when merging with the rule baseline.
pub const AGENT_MERGE_WEIGHT: f64 = 0.7;
/// A merge that moves a score by more than this increments the re-plan
/// counter used for agent-ness metrics.
pub const REPLAN_SCORE_DELTA: f64 = 0.15;

/// Clamp a score into the valid [0, 1] range.
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Merge a rule-baseline score with an escalated agent score.
///
/// The agent score only participates when the agent call actually produced
/// one (`fallback == false`) and it is positive; otherwise the rule score is
/// kept untouched. Returns `(merged, replanned)` where `replanned` is true
/// when the merge moved the score by more than [`REPLAN_SCORE_DELTA`].
pub fn merge_scores(rule: f64, agent: f64, fallback: bool) -> (f64, bool) {
    if fallback || agent <= 0.0 {
        return (clamp01(rule), false);
    }
    let merged = clamp01(RULE_MERGE_WEIGHT * rule + AGENT_MERGE_WEIGHT * agent);
    let replanned = (merged - rule).abs() > REPLAN_SCORE_DELTA;
    (merged, replanned)
}

/// Per-layer scoring weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub visual_form: f64,
    pub composition: f64,
    pub cultural_context: f64,
    pub symbolic_meaning: f64,
    pub philosophical_depth: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            visual_form: 0.2,
            composition: 0.2,
            cultural_context: 0.2,
            symbolic_meaning: 0.2,
            philosophical_depth: 0.2,
        }
    }
}

impl ScoreWeights {
    pub fn uniform(weight: f64) -> Self {
        Self {
            visual_form: weight,
            composition: weight,
            cultural_context: weight,
            symbolic_meaning: weight,
            philosophical_depth: weight,
        }
    }

    pub fn get(&self, layer: Layer) -> f64 {
        match layer {
            Layer::VisualForm => self.visual_form,
            Layer::Composition => self.composition,
            Layer::CulturalContext => self.cultural_context,
            Layer::SymbolicMeaning => self.symbolic_meaning,
            Layer::PhilosophicalDepth => self.philosophical_depth,
        }
    }
}

/// A plain five-element score vector indexed by layer.
///
/// Used where only the numbers matter (signal detection, fix-it planning),
/// keeping those functions pure over scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScoreVector {
    values: [f64; 5],
}

impl ScoreVector {
    pub fn new(values: [f64; 5]) -> Self {
        Self {
            values: values.map(clamp01),
        }
    }

    pub fn get(&self, layer: Layer) -> f64 {
        self.values[layer.index()]
    }

    pub fn set(&mut self, layer: Layer, value: f64) {
        self.values[layer.index()] = clamp01(value);
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Layers scoring strictly below `threshold`, in evaluation order
    pub fn layers_below(&self, threshold: f64) -> Vec<Layer> {
        Layer::ALL
            .iter()
            .copied()
            .filter(|l| self.get(*l) < threshold)
            .collect()
    }

    pub fn as_map(&self) -> BTreeMap<Layer, f64> {
        Layer::ALL.iter().map(|l| (*l, self.get(*l))).collect()
    }
}

/// Score for a single evaluation dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    pub layer: Layer,
    score: f64,
    pub rationale: String,
}

impl DimensionScore {
    pub fn new(layer: Layer, score: f64, rationale: impl Into<String>) -> Self {
        Self {
            layer,
            score: clamp01(score),
            rationale: rationale.into(),
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Replace the score (clamped) and rationale, e.g. after a merge
    pub fn replace(&mut self, score: f64, rationale: impl Into<String>) {
        self.score = clamp01(score);
        self.rationale = rationale.into();
    }
}

/// Severity of a risk tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// A named risk detected during rule-baseline scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskTag {
    pub code: String,
    pub message: String,
    pub severity: Severity,
}

impl RiskTag {
    pub fn new(code: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Gate thresholds applied to a scored candidate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GateConfig {
    pub pass_threshold: f64,
    pub min_dimension_score: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 0.7,
            min_dimension_score: 0.3,
        }
    }
}

/// Full scoring record for one candidate in one round.
///
/// The weighted total is recomputed whenever any dimension changes; the gate
/// verdict is recomputed explicitly via [`apply_gate`](Self::apply_gate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    pub candidate_id: String,
    dimensions: Vec<DimensionScore>,
    weighted_total: f64,
    pub risk_tags: Vec<RiskTag>,
    pub gate_passed: bool,
    pub rejection_reasons: Vec<String>,
}

impl CandidateScore {
    /// Build from one DimensionScore per layer (evaluation order enforced).
    pub fn new(
        candidate_id: impl Into<String>,
        mut dimensions: Vec<DimensionScore>,
        weights: &ScoreWeights,
    ) -> Self {
        dimensions.sort_by_key(|d| d.layer.index());
        let mut score = Self {
            candidate_id: candidate_id.into(),
            dimensions,
            weighted_total: 0.0,
            risk_tags: Vec::new(),
            gate_passed: false,
            rejection_reasons: Vec::new(),
        };
        score.recompute_total(weights);
        score
    }

    pub fn dimensions(&self) -> &[DimensionScore] {
        &self.dimensions
    }

    pub fn dimension(&self, layer: Layer) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.layer == layer)
    }

    pub fn weighted_total(&self) -> f64 {
        self.weighted_total
    }

    /// Replace one dimension's score and rationale, recomputing the total.
    pub fn replace_dimension(
        &mut self,
        layer: Layer,
        score: f64,
        rationale: impl Into<String>,
        weights: &ScoreWeights,
    ) {
        if let Some(dim) = self.dimensions.iter_mut().find(|d| d.layer == layer) {
            dim.replace(score, rationale);
        }
        self.recompute_total(weights);
    }

    pub fn score_vector(&self) -> ScoreVector {
        let mut vector = ScoreVector::default();
        for dim in &self.dimensions {
            vector.set(dim.layer, dim.score());
        }
        vector
    }

    fn recompute_total(&mut self, weights: &ScoreWeights) {
        self.weighted_total = self
            .dimensions
            .iter()
            .map(|d| d.score() * weights.get(d.layer))
            .sum();
    }

    /// Apply the gate: weighted total at or above the pass threshold, every
    /// dimension at or above the floor, and no critical risk tag.
    pub fn apply_gate(&mut self, gate: &GateConfig) {
        self.rejection_reasons.clear();

        if self.weighted_total < gate.pass_threshold {
            self.rejection_reasons.push(format!(
                "weighted total {:.3} below pass threshold {:.3}",
                self.weighted_total, gate.pass_threshold
            ));
        }
        for dim in &self.dimensions {
            if dim.score() < gate.min_dimension_score {
                self.rejection_reasons.push(format!(
                    "{} {:.3} below dimension floor {:.3}",
                    dim.layer,
                    dim.score(),
                    gate.min_dimension_score
                ));
            }
        }
        for tag in self.risk_tags.iter().filter(|t| t.is_critical()) {
            self.rejection_reasons
                .push(format!("critical risk: {}", tag.code));
        }

        self.gate_passed = self.rejection_reasons.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_candidate(values: [f64; 5]) -> CandidateScore {
        let weights = ScoreWeights::default();
        let dims = Layer::ALL
            .iter()
            .zip(values)
            .map(|(l, v)| DimensionScore::new(*l, v, "test"))
            .collect();
        CandidateScore::new("cand-1", dims, &weights)
    }

    #[test]
    fn test_dimension_score_clamped() {
        assert_eq!(DimensionScore::new(Layer::VisualForm, 1.7, "x").score(), 1.0);
        assert_eq!(DimensionScore::new(Layer::VisualForm, -0.2, "x").score(), 0.0);
    }

    #[test]
    fn test_merge_fallback_keeps_rule_score() {
        let (merged, replanned) = merge_scores(0.55, 0.0, true);
        assert_eq!(merged, 0.55);
        assert!(!replanned);

        // Non-positive agent score is treated like a fallback
        let (merged, _) = merge_scores(0.55, 0.0, false);
        assert_eq!(merged, 0.55);
    }

    #[test]
    fn test_merge_weights_and_replan_counter() {
        let (merged, replanned) = merge_scores(0.5, 0.9, false);
        assert!((merged - (0.3 * 0.5 + 0.7 * 0.9)).abs() < 1e-9);
        assert!(replanned); // moved by 0.28

        let (merged, replanned) = merge_scores(0.5, 0.6, false);
        assert!((merged - 0.57).abs() < 1e-9);
        assert!(!replanned); // moved by 0.07
    }

    #[test]
    fn test_merge_result_stays_clamped() {
        let (merged, _) = merge_scores(1.0, 1.0, false);
        assert!(merged <= 1.0);
        let (merged, _) = merge_scores(0.0, 0.1, false);
        assert!(merged >= 0.0);
    }

    #[test]
    fn test_weighted_total_recomputed_on_replace() {
        let weights = ScoreWeights::default();
        let mut score = uniform_candidate([0.5, 0.5, 0.5, 0.5, 0.5]);
        assert!((score.weighted_total() - 0.5).abs() < 1e-9);

        score.replace_dimension(Layer::CulturalContext, 1.0, "revised", &weights);
        assert!((score.weighted_total() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_gate_example_scenario() {
        // The L3-weak scenario: total 0.7 passes at threshold 0.6 with a
        // 0.15 dimension floor.
        let mut score = uniform_candidate([0.9, 0.85, 0.2, 0.6, 0.95]);
        assert!((score.weighted_total() - 0.7).abs() < 1e-9);

        score.apply_gate(&GateConfig {
            pass_threshold: 0.6,
            min_dimension_score: 0.15,
        });
        assert!(score.gate_passed, "{:?}", score.rejection_reasons);
    }

    #[test]
    fn test_gate_dimension_floor() {
        let mut score = uniform_candidate([0.9, 0.85, 0.2, 0.6, 0.95]);
        score.apply_gate(&GateConfig {
            pass_threshold: 0.6,
            min_dimension_score: 0.3,
        });
        assert!(!score.gate_passed);
        assert_eq!(score.rejection_reasons.len(), 1);
    }

    #[test]
    fn test_gate_critical_risk_blocks() {
        let mut score = uniform_candidate([0.9, 0.9, 0.9, 0.9, 0.9]);
        score
            .risk_tags
            .push(RiskTag::new("forgery", "looks traced", Severity::Critical));
        score.apply_gate(&GateConfig::default());
        assert!(!score.gate_passed);
    }

    #[test]
    fn test_gate_monotonicity() {
        // Raising any dimension of a passing candidate never flips the gate
        // back to failing under the same weights.
        let weights = ScoreWeights::default();
        let gate = GateConfig {
            pass_threshold: 0.6,
            min_dimension_score: 0.15,
        };
        let mut score = uniform_candidate([0.9, 0.85, 0.2, 0.6, 0.95]);
        score.apply_gate(&gate);
        assert!(score.gate_passed);

        for layer in Layer::ALL {
            let mut raised = score.clone();
            let bumped = raised.dimension(layer).unwrap().score() + 0.05;
            raised.replace_dimension(layer, bumped, "raised", &weights);
            raised.apply_gate(&gate);
            assert!(raised.gate_passed, "raising {} broke the gate", layer);
        }
    }
}
