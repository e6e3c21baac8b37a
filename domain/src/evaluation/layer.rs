//! The five evaluation layers (L1-L5)

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One of the five evaluation dimensions, ordered from low-level visual
/// perception (L1) to high-level philosophical/aesthetic assessment (L5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// L1 - low-level visual perception (form, color, rendering quality)
    VisualForm,
    /// L2 - composition and technique
    Composition,
    /// L3 - fidelity to the cultural tradition being evoked
    CulturalContext,
    /// L4 - symbolic and narrative content
    SymbolicMeaning,
    /// L5 - philosophical / aesthetic depth
    PhilosophicalDepth,
}

impl Layer {
    /// All layers in evaluation order (L1 first)
    pub const ALL: [Layer; 5] = [
        Layer::VisualForm,
        Layer::Composition,
        Layer::CulturalContext,
        Layer::SymbolicMeaning,
        Layer::PhilosophicalDepth,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Layer::VisualForm => "visual_form",
            Layer::Composition => "composition",
            Layer::CulturalContext => "cultural_context",
            Layer::SymbolicMeaning => "symbolic_meaning",
            Layer::PhilosophicalDepth => "philosophical_depth",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Layer::VisualForm => "Visual Form",
            Layer::Composition => "Composition",
            Layer::CulturalContext => "Cultural Context",
            Layer::SymbolicMeaning => "Symbolic Meaning",
            Layer::PhilosophicalDepth => "Philosophical Depth",
        }
    }

    /// Short code, "L1" through "L5"
    pub fn code(&self) -> &str {
        match self {
            Layer::VisualForm => "L1",
            Layer::Composition => "L2",
            Layer::CulturalContext => "L3",
            Layer::SymbolicMeaning => "L4",
            Layer::PhilosophicalDepth => "L5",
        }
    }

    /// Zero-based position in evaluation order
    pub fn index(&self) -> usize {
        Layer::ALL.iter().position(|l| l == self).expect("layer in ALL")
    }

    /// The perception layers (L1-L2) need to see the candidate image
    pub fn requires_vision(&self) -> bool {
        matches!(self, Layer::VisualForm | Layer::Composition)
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Layer {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visual_form" | "l1" | "L1" => Ok(Layer::VisualForm),
            "composition" | "l2" | "L2" => Ok(Layer::Composition),
            "cultural_context" | "l3" | "L3" => Ok(Layer::CulturalContext),
            "symbolic_meaning" | "l4" | "L4" => Ok(Layer::SymbolicMeaning),
            "philosophical_depth" | "l5" | "L5" => Ok(Layer::PhilosophicalDepth),
            other => Err(DomainError::UnknownLayer(other.to_string())),
        }
    }
}
