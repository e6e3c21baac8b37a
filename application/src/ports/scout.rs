//! Scout port
//!
//! Gathers the reference material a run evaluates against.

use async_trait::async_trait;
use atelier_domain::{CulturalTradition, EvidencePack};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Evidence gathering failed: {0}")]
    GatherFailed(String),
}

#[async_trait]
pub trait ScoutPort: Send + Sync {
    /// Gather an evidence pack for the subject. `extra_queries` come from a
    /// previous round's evidence request and widen the search.
    async fn gather_evidence(
        &self,
        subject: &str,
        tradition: CulturalTradition,
        extra_queries: &[String],
    ) -> Result<EvidencePack, ScoutError>;
}
