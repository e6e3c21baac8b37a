//! Pipeline stages and per-stage results

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A stage of the run state machine, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scout,
    Draft,
    Critic,
    Queen,
    Archivist,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Scout,
        Stage::Draft,
        Stage::Critic,
        Stage::Queen,
        Stage::Archivist,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Stage::Scout => "scout",
            Stage::Draft => "draft",
            Stage::Critic => "critic",
            Stage::Queen => "queen",
            Stage::Archivist => "archivist",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::Scout => "Scout",
            Stage::Draft => "Draft",
            Stage::Critic => "Critic",
            Stage::Queen => "Queen",
            Stage::Archivist => "Archivist",
        }
    }

    /// Stages strictly before this one; these must have checkpoints when a
    /// run resumes from here.
    pub fn prerequisites(&self) -> &'static [Stage] {
        let idx = Stage::ALL.iter().position(|s| s == self).expect("stage in ALL");
        &Stage::ALL[..idx]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scout" => Ok(Stage::Scout),
            "draft" => Ok(Stage::Draft),
            "critic" => Ok(Stage::Critic),
            "queen" => Ok(Stage::Queen),
            "archivist" => Ok(Stage::Archivist),
            other => Err(DomainError::UnknownStage(other.to_string())),
        }
    }
}

/// Outcome of one stage execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Skipped,
    Failed,
}

impl StageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StageStatus::Completed => "completed",
            StageStatus::Skipped => "skipped",
            StageStatus::Failed => "failed",
        }
    }
}

/// Record of one stage execution. Status is set exactly once, at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: Stage,
    pub status: StageStatus,
    pub latency_ms: u64,
    pub summary: String,
}

impl StageResult {
    pub fn completed(stage: Stage, latency_ms: u64, summary: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Completed,
            latency_ms,
            summary: summary.into(),
        }
    }

    pub fn skipped(stage: Stage, summary: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped,
            latency_ms: 0,
            summary: summary.into(),
        }
    }

    pub fn failed(stage: Stage, latency_ms: u64, summary: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Failed,
            latency_ms,
            summary: summary.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_prerequisites() {
        assert!(Stage::Scout < Stage::Critic);
        assert_eq!(Stage::Critic.prerequisites(), &[Stage::Scout, Stage::Draft]);
        assert!(Stage::Scout.prerequisites().is_empty());
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!("critic".parse::<Stage>().unwrap(), Stage::Critic);
        assert!("publish".parse::<Stage>().is_err());
    }

    #[test]
    fn test_stage_result_constructors() {
        let result = StageResult::skipped(Stage::Scout, "loaded from checkpoint");
        assert_eq!(result.status, StageStatus::Skipped);
        assert_eq!(result.latency_ms, 0);
    }
}
