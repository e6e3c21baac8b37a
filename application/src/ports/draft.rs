//! Draft port
//!
//! Candidate generation and refinement behind the image backends.

use async_trait::async_trait;
use atelier_domain::{Candidate, CulturalTradition, FixItPlan, Layer};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Refinement failed for candidate {candidate_id}: {message}")]
    RefinementFailed { candidate_id: String, message: String },
}

/// One generation request. Seeds are assigned per slot as
/// `seed_base + index` so a round's candidates are reproducible.
#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub subject: String,
    pub tradition: CulturalTradition,
    pub count: usize,
    pub seed_base: u64,
    /// Per-dimension guidance carried over from a rerun decision.
    pub prompt_hints: Vec<String>,
}

/// One local-rerun request: repair a single candidate in place.
///
/// Carries the critic's fix-it plan when one exists, plus explicit
/// target/preserve layer lists so a refinement can be requested without a
/// plan (the targets then come from the decision or the rerun hint).
#[derive(Debug, Clone)]
pub struct RefineRequest {
    pub candidate: Candidate,
    pub fixit_plan: Option<FixItPlan>,
    /// Dimensions the refinement must improve.
    pub target_layers: Vec<Layer>,
    /// Dimensions whose traits carry over untouched, human locks included.
    pub preserve_layers: Vec<Layer>,
}

#[async_trait]
pub trait DraftPort: Send + Sync {
    /// Generate a fresh batch of candidates.
    async fn generate(&self, request: &DraftRequest) -> Result<Vec<Candidate>, DraftError>;

    /// Refine exactly one candidate, keeping the original's seed lineage
    /// and leaving the preserved dimensions alone.
    async fn refine(&self, request: &RefineRequest) -> Result<Candidate, DraftError>;
}
