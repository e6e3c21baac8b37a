//! Candidates and evidence packs

use crate::core::error::DomainError;
use crate::evaluation::layer::Layer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which image-generation backend produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageProvider {
    Gemini,
    Dalle,
    StableDiffusion,
}

impl ImageProvider {
    pub fn as_str(&self) -> &str {
        match self {
            ImageProvider::Gemini => "gemini",
            ImageProvider::Dalle => "dalle",
            ImageProvider::StableDiffusion => "stable_diffusion",
        }
    }

    /// Default per-image cost in USD; config may override.
    pub fn default_cost_per_image(&self) -> f64 {
        match self {
            ImageProvider::Gemini => 0.003,
            ImageProvider::Dalle => 0.004,
            ImageProvider::StableDiffusion => 0.002,
        }
    }
}

impl std::str::FromStr for ImageProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(ImageProvider::Gemini),
            "dalle" => Ok(ImageProvider::Dalle),
            "stable_diffusion" => Ok(ImageProvider::StableDiffusion),
            other => Err(DomainError::InvalidInput(format!(
                "unknown image provider: {other}"
            ))),
        }
    }
}

/// A generated candidate work.
///
/// The trait profile is the draft collaborator's own per-layer quality
/// estimate, derived from generation metadata; the rule baseline starts from
/// it when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub prompt: String,
    pub seed: u64,
    pub provider: ImageProvider,
    pub asset_ref: Option<String>,
    #[serde(default)]
    pub trait_profile: BTreeMap<Layer, f64>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, seed: u64) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            seed,
            provider: ImageProvider::Gemini,
            asset_ref: None,
            trait_profile: BTreeMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: ImageProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_asset_ref(mut self, asset_ref: impl Into<String>) -> Self {
        self.asset_ref = Some(asset_ref.into());
        self
    }

    pub fn with_trait(mut self, layer: Layer, value: f64) -> Self {
        self.trait_profile.insert(layer, value.clamp(0.0, 1.0));
        self
    }

    /// One-line description used in agent briefings and event summaries.
    pub fn summary(&self) -> String {
        format!("candidate {} (seed {}): {}", self.id, self.seed, self.prompt)
    }
}

/// A single retrieved reference item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub source: String,
    pub claim: String,
    #[serde(default)]
    pub terms: Vec<String>,
}

impl EvidenceItem {
    pub fn new(source: impl Into<String>, claim: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            claim: claim.into(),
            terms: Vec::new(),
        }
    }

    pub fn with_terms(mut self, terms: Vec<String>) -> Self {
        self.terms = terms;
        self
    }
}

/// Structured bundle of retrieved reference material grounding a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidencePack {
    pub id: String,
    pub subject: String,
    pub items: Vec<EvidenceItem>,
    /// How much of the expected reference space is covered, in [0, 1].
    pub coverage: f64,
}

impl EvidencePack {
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            items: Vec::new(),
            coverage: 0.0,
        }
    }

    pub fn with_items(mut self, items: Vec<EvidenceItem>, coverage: f64) -> Self {
        self.items = items;
        self.coverage = coverage.clamp(0.0, 1.0);
        self
    }

    /// Case-insensitive substring search over sources, claims and terms.
    pub fn search(&self, query: &str) -> Vec<&EvidenceItem> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.source.to_lowercase().contains(&needle)
                    || item.claim.to_lowercase().contains(&needle)
                    || item.terms.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Look up a single term across item term lists.
    pub fn lookup_term(&self, term: &str) -> Option<&EvidenceItem> {
        let needle = term.to_lowercase();
        self.items
            .iter()
            .find(|item| item.terms.iter().any(|t| t.to_lowercase() == needle))
    }

    /// Compact rendering for agent briefings.
    pub fn summary(&self) -> String {
        format!(
            "{} reference items on '{}' (coverage {:.2})",
            self.items.len(),
            self.subject,
            self.coverage
        )
    }
}
