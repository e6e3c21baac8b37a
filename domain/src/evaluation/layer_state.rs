//! Per-dimension scoring record mutated across escalation

use super::layer::Layer;
use super::score::clamp01;
use crate::agent::result::AgentResult;
use serde::{Deserialize, Serialize};

/// Mutable per-dimension scoring record (Entity).
///
/// Created once per dimension per candidate evaluation, seeded by the rule
/// baseline, and mutated when an escalated agent evaluation lands. The
/// `escalated` flag is only ever set by a non-fallback agent result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerState {
    pub layer: Layer,
    pub score: f64,
    pub confidence: f64,
    pub escalated: bool,
    pub cost_spent: f64,
    analysis: Vec<String>,
}

impl LayerState {
    pub fn new(layer: Layer, score: f64, confidence: f64) -> Self {
        Self {
            layer,
            score: clamp01(score),
            confidence: clamp01(confidence),
            escalated: false,
            cost_spent: 0.0,
            analysis: Vec::new(),
        }
    }

    /// Append a fragment of analysis text (rule rationale, agent reasoning).
    pub fn add_analysis(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.analysis.push(text);
        }
    }

    /// The accumulated analysis text, oldest first.
    pub fn analysis_text(&self) -> String {
        self.analysis.join("\n")
    }

    /// Fold a successful agent evaluation into this state.
    ///
    /// Fallback results are ignored entirely apart from cost accrual: the
    /// rule baseline stays authoritative and `escalated` stays false.
    pub fn apply_agent_result(&mut self, result: &AgentResult) {
        self.cost_spent += result.cost_usd;
        if result.fallback_used {
            return;
        }
        self.score = clamp01(result.score);
        self.confidence = clamp01(result.confidence);
        self.escalated = true;
        self.add_analysis(result.rationale.clone());
    }
}
