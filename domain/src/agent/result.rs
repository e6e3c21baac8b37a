//! Outcome of one agent evaluation

use crate::evaluation::score::clamp01;
use serde::{Deserialize, Serialize};

/// Result of a single `AgentRuntime::evaluate` call.
///
/// Produced exactly once per call. When `fallback_used` is true the score
/// carries no information (it may be 0) and must never be merged into a
/// dimension score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub score: f64,
    pub confidence: f64,
    pub rationale: String,
    pub evidence_refs: Vec<String>,
    pub tool_calls: u32,
    pub llm_calls: u32,
    pub cost_usd: f64,
    pub fallback_used: bool,
    pub latency_ms: u64,
}

impl AgentResult {
    /// A successful submission from the model.
    pub fn submitted(
        score: f64,
        confidence: f64,
        rationale: impl Into<String>,
        evidence_refs: Vec<String>,
    ) -> Self {
        Self {
            score: clamp01(score),
            confidence: clamp01(confidence),
            rationale: rationale.into(),
            evidence_refs,
            tool_calls: 0,
            llm_calls: 0,
            cost_usd: 0.0,
            fallback_used: false,
            latency_ms: 0,
        }
    }

    /// A degraded result: the runtime could not obtain a usable evaluation.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            confidence: 0.0,
            rationale: reason.into(),
            evidence_refs: Vec::new(),
            tool_calls: 0,
            llm_calls: 0,
            cost_usd: 0.0,
            fallback_used: true,
            latency_ms: 0,
        }
    }

    /// Attach usage accounting collected over the evaluation.
    pub fn with_usage(mut self, tool_calls: u32, llm_calls: u32, cost_usd: f64, latency_ms: u64) -> Self {
        self.tool_calls = tool_calls;
        self.llm_calls = llm_calls;
        self.cost_usd = cost_usd;
        self.latency_ms = latency_ms;
        self
    }
}
