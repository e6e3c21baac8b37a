//! Offline draft collaborator
//!
//! Produces deterministic candidates whose trait profiles are derived from
//! the seed, so a rerun with the same seed base reproduces the same batch.
//! Refinement bumps the targeted dimensions and keeps the seed lineage.

use async_trait::async_trait;
use atelier_application::ports::{DraftError, DraftPort, DraftRequest, RefineRequest};
use atelier_domain::{Candidate, ImageProvider, Layer};
use tracing::debug;

/// How much a refinement improves each targeted dimension.
const REFINE_BOOST: f64 = 0.25;

pub struct StudioDraft {
    provider: ImageProvider,
}

impl StudioDraft {
    pub fn new(provider: ImageProvider) -> Self {
        Self { provider }
    }
}

impl Default for StudioDraft {
    fn default() -> Self {
        Self::new(ImageProvider::Gemini)
    }
}

/// splitmix64, folded to [0, 1).
fn pseudo_unit(seed: u64, salt: u64) -> f64 {
    let mut z = seed.wrapping_add(salt.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z = z ^ (z >> 31);
    (z >> 11) as f64 / (1u64 << 53) as f64
}

fn seeded_profile(seed: u64, hint_count: usize) -> Vec<(Layer, f64)> {
    Layer::ALL
        .iter()
        .map(|layer| {
            let base = 0.35 + 0.55 * pseudo_unit(seed, layer.index() as u64 + 1);
            let hinted = base + 0.05 * hint_count as f64;
            (*layer, hinted)
        })
        .collect()
}

#[async_trait]
impl DraftPort for StudioDraft {
    async fn generate(&self, request: &DraftRequest) -> Result<Vec<Candidate>, DraftError> {
        if request.count == 0 {
            return Err(DraftError::GenerationFailed(
                "candidate count must be positive".to_string(),
            ));
        }

        let mut prompt = format!(
            "{}, in the {} tradition",
            request.subject,
            request.tradition.display_name()
        );
        if !request.prompt_hints.is_empty() {
            prompt.push_str("; ");
            prompt.push_str(&request.prompt_hints.join("; "));
        }

        let candidates = (0..request.count)
            .map(|slot| {
                let seed = request.seed_base + slot as u64;
                let mut candidate = Candidate::new(format!("cand-{seed}"), &prompt, seed)
                    .with_provider(self.provider);
                for (layer, value) in seeded_profile(seed, request.prompt_hints.len()) {
                    candidate = candidate.with_trait(layer, value);
                }
                candidate
            })
            .collect::<Vec<_>>();
        debug!(count = candidates.len(), seed_base = request.seed_base, "batch drafted");
        Ok(candidates)
    }

    async fn refine(&self, request: &RefineRequest) -> Result<Candidate, DraftError> {
        let candidate = &request.candidate;
        let deltas: Vec<String> = match &request.fixit_plan {
            Some(plan) => plan.items.iter().map(|i| i.prompt_delta.clone()).collect(),
            None => request
                .target_layers
                .iter()
                .map(|l| format!("strengthen the {} dimension", l.display_name().to_lowercase()))
                .collect(),
        };
        let prompt = if deltas.is_empty() {
            candidate.prompt.clone()
        } else {
            format!("{}; {}", candidate.prompt, deltas.join("; "))
        };
        let mut refined = Candidate::new(format!("{}-r", candidate.id), prompt, candidate.seed)
            .with_provider(candidate.provider);

        for (layer, value) in &candidate.trait_profile {
            refined = refined.with_trait(*layer, *value);
        }
        for layer in &request.target_layers {
            if request.preserve_layers.contains(layer) {
                continue;
            }
            let current = candidate.trait_profile.get(layer).copied().unwrap_or(0.4);
            refined = refined.with_trait(*layer, current + REFINE_BOOST);
        }
        Ok(refined)
    }
}
