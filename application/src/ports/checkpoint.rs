//! Checkpoint store port
//!
//! Stage outputs are persisted as JSON documents keyed by task and stage so
//! an interrupted run can resume without re-executing earlier stages.

use async_trait::async_trait;
use atelier_domain::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Checkpoint I/O error: {0}")]
    Io(String),

    #[error("Corrupt checkpoint for stage {stage}: {message}")]
    Corrupt { stage: Stage, message: String },

    #[error("Missing checkpoint for stage {0}")]
    Missing(Stage),
}

#[async_trait]
pub trait CheckpointPort: Send + Sync {
    /// Persist one stage's output document, replacing any previous one.
    async fn save_stage(
        &self,
        task_id: &str,
        stage: Stage,
        document: &serde_json::Value,
    ) -> Result<(), CheckpointError>;

    /// Load a stage's output document, None when never saved.
    async fn load_stage(
        &self,
        task_id: &str,
        stage: Stage,
    ) -> Result<Option<serde_json::Value>, CheckpointError>;

    /// Persist the run's final output document.
    async fn save_output(
        &self,
        task_id: &str,
        document: &serde_json::Value,
    ) -> Result<(), CheckpointError>;

    /// Update the cross-run index entry for this task.
    async fn update_index(
        &self,
        task_id: &str,
        entry: &serde_json::Value,
    ) -> Result<(), CheckpointError>;
}
