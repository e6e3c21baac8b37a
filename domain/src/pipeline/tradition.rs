//! Cultural tradition variants
//!
//! A closed set of traditions resolved once at run configuration time.
//! Behavior differences (local-edit permission, motif lexicons) hang off
//! this enum instead of string comparisons scattered through the pipeline.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The cultural framing a run evaluates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CulturalTradition {
    InkWash,
    Ukiyoe,
    Impressionism,
    Surrealism,
    Contemporary,
}

impl CulturalTradition {
    pub const ALL: [CulturalTradition; 5] = [
        CulturalTradition::InkWash,
        CulturalTradition::Ukiyoe,
        CulturalTradition::Impressionism,
        CulturalTradition::Surrealism,
        CulturalTradition::Contemporary,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            CulturalTradition::InkWash => "ink_wash",
            CulturalTradition::Ukiyoe => "ukiyoe",
            CulturalTradition::Impressionism => "impressionism",
            CulturalTradition::Surrealism => "surrealism",
            CulturalTradition::Contemporary => "contemporary",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CulturalTradition::InkWash => "Ink Wash",
            CulturalTradition::Ukiyoe => "Ukiyo-e",
            CulturalTradition::Impressionism => "Impressionism",
            CulturalTradition::Surrealism => "Surrealism",
            CulturalTradition::Contemporary => "Contemporary",
        }
    }

    /// Whether targeted inpainting is an acceptable repair for this tradition.
    ///
    /// Ink wash forbids local edits: a patched wash reads as damage, so a
    /// local-rerun decision is forced to a full rerun instead.
    pub fn allows_local_rerun(&self) -> bool {
        !matches!(self, CulturalTradition::InkWash)
    }

    /// Canonical motif vocabulary used by the rule baseline to measure how
    /// strongly a candidate's prompt engages the tradition.
    pub fn motif_terms(&self) -> &'static [&'static str] {
        match self {
            CulturalTradition::InkWash => {
                &["ink", "wash", "brush", "mist", "mountain", "bamboo", "emptiness"]
            }
            CulturalTradition::Ukiyoe => {
                &["woodblock", "wave", "floating", "courtesan", "fuji", "print", "edo"]
            }
            CulturalTradition::Impressionism => {
                &["light", "plein", "air", "dappled", "haystack", "impression", "brushstroke"]
            }
            CulturalTradition::Surrealism => {
                &["dream", "melting", "juxtaposition", "uncanny", "subconscious", "metamorphosis"]
            }
            CulturalTradition::Contemporary => {
                &["installation", "concept", "mixed", "media", "appropriation", "digital"]
            }
        }
    }
}

impl std::fmt::Display for CulturalTradition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CulturalTradition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ink_wash" | "ink-wash" => Ok(CulturalTradition::InkWash),
            "ukiyoe" | "ukiyo-e" => Ok(CulturalTradition::Ukiyoe),
            "impressionism" => Ok(CulturalTradition::Impressionism),
            "surrealism" => Ok(CulturalTradition::Surrealism),
            "contemporary" => Ok(CulturalTradition::Contemporary),
            other => Err(DomainError::UnknownTradition(other.to_string())),
        }
    }
}
