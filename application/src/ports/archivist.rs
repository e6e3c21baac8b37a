//! Archivist port

use async_trait::async_trait;
use atelier_domain::{Candidate, CandidateScore, QueenDecision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive failed: {0}")]
    ArchiveFailed(String),
}

/// Everything worth keeping about a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub task_id: String,
    pub decision: QueenDecision,
    pub best_candidate: Option<Candidate>,
    pub best_score: Option<CandidateScore>,
    pub total_rounds: u32,
    pub total_cost_usd: f64,
    pub archived_at: DateTime<Utc>,
}

#[async_trait]
pub trait ArchivistPort: Send + Sync {
    /// Persist the record; returns a location reference (path, URI).
    async fn archive(&self, record: &ArchiveRecord) -> Result<String, ArchiveError>;
}
