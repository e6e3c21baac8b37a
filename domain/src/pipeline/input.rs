//! Run input

use super::stage::Stage;
use super::tradition::CulturalTradition;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Caller-provided description of a run. Read-only once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInput {
    /// Immutable, unique per run.
    pub task_id: String,
    pub subject: String,
    pub tradition: CulturalTradition,
    /// Resume here, loading every strictly-earlier stage from checkpoints.
    pub resume_from: Option<Stage>,
}

impl PipelineInput {
    pub fn new(
        task_id: impl Into<String>,
        subject: impl Into<String>,
        tradition: CulturalTradition,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            subject: subject.into(),
            tradition,
            resume_from: None,
        }
    }

    pub fn with_resume_from(mut self, stage: Stage) -> Self {
        self.resume_from = Some(stage);
        self
    }

    /// Precondition check run before any stage executes.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.task_id.trim().is_empty() {
            return Err(DomainError::InvalidInput("task id must not be empty".into()));
        }
        if self.subject.trim().is_empty() {
            return Err(DomainError::InvalidInput("subject must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        let input = PipelineInput::new("t1", "a heron", CulturalTradition::InkWash);
        assert!(input.validate().is_ok());

        let input = PipelineInput::new("t1", "  ", CulturalTradition::InkWash);
        assert!(input.validate().is_err());
    }
}
