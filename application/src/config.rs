//! Runtime configuration for a pipeline run
//!
//! Assembled by the infrastructure config loader; every knob has a default
//! so a bare run works without any config file.

use atelier_domain::{GateConfig, QueenPolicy, ScoreWeights};
use serde::{Deserialize, Serialize};

/// How escalation walks the five layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EscalationMode {
    /// Rank layers by priority and escalate the top few concurrently-safe
    /// (still executed in order, no shared analysis context).
    #[default]
    Parallel,
    /// Walk L1..L5 in order, each escalation seeing prior layers' analyses.
    Progressive,
}

/// Critic-stage knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticConfig {
    pub mode: EscalationMode,
    /// Hard cap on escalations per candidate. Also bounds the progressive
    /// walk: with the default of 3, layers past L3 never escalate in
    /// progressive mode regardless of confidence.
    pub max_escalations: usize,
    /// Parallel-mode layers below this priority are not worth an agent call.
    pub min_priority: f64,
    pub top_k: usize,
}

impl Default for CriticConfig {
    fn default() -> Self {
        Self {
            mode: EscalationMode::Parallel,
            max_escalations: 3,
            min_priority: 0.1,
            top_k: 3,
        }
    }
}

/// Agent-runtime knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Total model round-trips per evaluation, forced submission included.
    pub max_steps: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_steps: 6 }
    }
}

/// Human-in-the-loop knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitlConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for HitlConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 300,
        }
    }
}

/// Cost constants and budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    /// Per-image cost override; None uses the provider default.
    pub cost_per_image: Option<f64>,
    /// Hard per-run ceiling on image generation spend, USD.
    pub image_ceiling_usd: f64,
    /// Soft budget for LLM escalation spend, USD.
    pub llm_budget_usd: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            cost_per_image: None,
            image_ceiling_usd: 0.50,
            llm_budget_usd: 1.0,
        }
    }
}

/// Complete runtime configuration for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub weights: ScoreWeights,
    pub gate: GateConfig,
    pub queen: QueenPolicy,
    pub critic: CriticConfig,
    pub agent: AgentConfig,
    pub hitl: HitlConfig,
    pub cost: CostConfig,
    pub candidates_per_round: usize,
    pub seed_base: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            gate: GateConfig::default(),
            queen: QueenPolicy::default(),
            critic: CriticConfig::default(),
            agent: AgentConfig::default(),
            hitl: HitlConfig::default(),
            cost: CostConfig::default(),
            candidates_per_round: 3,
            seed_base: 1_000,
        }
    }
}

impl PipelineConfig {
    pub fn validated(self) -> Result<Self, String> {
        if self.candidates_per_round == 0 {
            return Err("candidates_per_round must be at least 1".to_string());
        }
        if self.queen.max_rounds == 0 {
            return Err("max_rounds must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.gate.pass_threshold) {
            return Err("pass_threshold must be within [0, 1]".to_string());
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.candidates_per_round, 3);
        assert_eq!(config.critic.max_escalations, 3);
        assert_eq!(config.hitl.timeout_secs, 300);
        assert!((config.cost.image_ceiling_usd - 0.50).abs() < 1e-9);
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_candidates() {
        let config = PipelineConfig {
            candidates_per_round: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validated().is_err());
    }
}
