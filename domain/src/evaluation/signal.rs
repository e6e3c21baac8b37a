//! Cross-layer inconsistency signals
//!
//! Five fixed threshold rules over the merged score vector. The thresholds
//! are hand-tuned heuristics carried over verbatim; treat any change as a
//! behavior change, not a bug fix.

use super::layer::Layer;
use super::score::{clamp01, ScoreVector};
use serde::{Deserialize, Serialize};

/// Kind of cross-layer signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// High/low split between depth and surface reading suggests the work
    /// should be re-read in another register.
    Reinterpret,
    /// Two layers contradict each other.
    Conflict,
    /// Low grounding layers suggest missing reference material.
    EvidenceGap,
    /// All layers agree the work is strong.
    Confirmation,
}

impl SignalType {
    pub fn as_str(&self) -> &str {
        match self {
            SignalType::Reinterpret => "reinterpret",
            SignalType::Conflict => "conflict",
            SignalType::EvidenceGap => "evidence_gap",
            SignalType::Confirmation => "confirmation",
        }
    }
}

/// A single cross-layer signal, strength in [0, 1] derived from score deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossLayerSignal {
    pub source: Layer,
    pub target: Layer,
    pub signal_type: SignalType,
    pub message: String,
    pub strength: f64,
}

/// |L5 - L1| above this emits a reinterpret signal.
pub const REINTERPRET_DELTA: f64 = 0.3;
/// L3 below this together with L5 above [`CONFLICT_DEPTH_MIN`] is a conflict.
pub const CONFLICT_CULTURE_MAX: f64 = 0.4;
pub const CONFLICT_DEPTH_MIN: f64 = 0.8;
/// L1 above this with L5 below [`HOLLOW_DEPTH_MAX`] is the hollow-virtuosity conflict.
pub const HOLLOW_SURFACE_MIN: f64 = 0.8;
pub const HOLLOW_DEPTH_MAX: f64 = 0.3;
/// Both grounding layers (L3, L4) below this is an evidence gap.
pub const GROUNDING_GAP_MAX: f64 = 0.4;
/// Every layer at or above this is a confirmation.
pub const CONFIRMATION_MIN: f64 = 0.7;

/// Detect cross-layer signals from a merged score vector.
///
/// Pure function of the scores: identical vectors always produce identical
/// signal sets, in a fixed rule order.
pub fn detect_cross_layer_signals(scores: &ScoreVector) -> Vec<CrossLayerSignal> {
    let l1 = scores.get(Layer::VisualForm);
    let l3 = scores.get(Layer::CulturalContext);
    let l4 = scores.get(Layer::SymbolicMeaning);
    let l5 = scores.get(Layer::PhilosophicalDepth);

    let mut signals = Vec::new();

    // Rule 1: depth and surface disagree strongly
    let delta = (l5 - l1).abs();
    if delta > REINTERPRET_DELTA {
        let message = if l5 > l1 {
            "philosophical reading far exceeds visual execution; reinterpret the surface layers"
        } else {
            "visual execution far exceeds the philosophical reading; reinterpret the depth layers"
        };
        signals.push(CrossLayerSignal {
            source: Layer::PhilosophicalDepth,
            target: Layer::VisualForm,
            signal_type: SignalType::Reinterpret,
            message: message.to_string(),
            strength: clamp01(delta),
        });
    }

    // Rule 2: deep reading of a culturally unmoored work
    if l3 < CONFLICT_CULTURE_MAX && l5 > CONFLICT_DEPTH_MIN {
        signals.push(CrossLayerSignal {
            source: Layer::CulturalContext,
            target: Layer::PhilosophicalDepth,
            signal_type: SignalType::Conflict,
            message: "high philosophical score rests on weak cultural grounding".to_string(),
            strength: clamp01((CONFLICT_CULTURE_MAX - l3) + (l5 - CONFLICT_DEPTH_MIN)),
        });
    }

    // Rule 3: hollow virtuosity
    if l1 > HOLLOW_SURFACE_MIN && l5 < HOLLOW_DEPTH_MAX {
        signals.push(CrossLayerSignal {
            source: Layer::VisualForm,
            target: Layer::PhilosophicalDepth,
            signal_type: SignalType::Conflict,
            message: "polished surface with little aesthetic depth".to_string(),
            strength: clamp01((l1 - HOLLOW_SURFACE_MIN) + (HOLLOW_DEPTH_MAX - l5)),
        });
    }

    // Rule 4: both grounding layers weak
    if l3 < GROUNDING_GAP_MAX && l4 < GROUNDING_GAP_MAX {
        signals.push(CrossLayerSignal {
            source: Layer::CulturalContext,
            target: Layer::SymbolicMeaning,
            signal_type: SignalType::EvidenceGap,
            message: "cultural and symbolic layers both under-grounded; gather references"
                .to_string(),
            strength: clamp01((GROUNDING_GAP_MAX - l3) + (GROUNDING_GAP_MAX - l4)),
        });
    }

    // Rule 5: uniform strength
    if Layer::ALL.iter().all(|l| scores.get(*l) >= CONFIRMATION_MIN) {
        signals.push(CrossLayerSignal {
            source: Layer::VisualForm,
            target: Layer::PhilosophicalDepth,
            signal_type: SignalType::Confirmation,
            message: "all layers agree the work is strong".to_string(),
            strength: clamp01((scores.mean() - CONFIRMATION_MIN) / (1.0 - CONFIRMATION_MIN)),
        });
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(values: [f64; 5]) -> ScoreVector {
        ScoreVector::new(values)
    }

    #[test]
    fn test_scenario_emits_single_conflict() {
        // {L1:0.9, L2:0.85, L3:0.2, L4:0.6, L5:0.95} must produce exactly
        // the culture/depth CONFLICT and nothing else.
        let signals = detect_cross_layer_signals(&vector([0.9, 0.85, 0.2, 0.6, 0.95]));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::Conflict);
        assert_eq!(signals[0].source, Layer::CulturalContext);
        assert_eq!(signals[0].target, Layer::PhilosophicalDepth);
        assert!(signals[0].strength > 0.0 && signals[0].strength <= 1.0);
    }

    #[test]
    fn test_reinterpret_both_directions() {
        let up = detect_cross_layer_signals(&vector([0.3, 0.5, 0.5, 0.5, 0.9]));
        assert!(up
            .iter()
            .any(|s| s.signal_type == SignalType::Reinterpret && s.message.contains("exceeds visual")));

        let down = detect_cross_layer_signals(&vector([0.9, 0.5, 0.5, 0.5, 0.3]));
        assert!(down
            .iter()
            .any(|s| s.signal_type == SignalType::Reinterpret && s.message.contains("exceeds the philosophical")));
    }

    #[test]
    fn test_hollow_virtuosity_conflict() {
        let signals = detect_cross_layer_signals(&vector([0.95, 0.6, 0.6, 0.6, 0.2]));
        assert!(signals
            .iter()
            .any(|s| s.signal_type == SignalType::Conflict && s.source == Layer::VisualForm));
    }

    #[test]
    fn test_evidence_gap() {
        let signals = detect_cross_layer_signals(&vector([0.6, 0.6, 0.3, 0.35, 0.6]));
        assert!(signals
            .iter()
            .any(|s| s.signal_type == SignalType::EvidenceGap));
    }

    #[test]
    fn test_confirmation() {
        let signals = detect_cross_layer_signals(&vector([0.8, 0.75, 0.9, 0.7, 0.85]));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::Confirmation);
    }

    #[test]
    fn test_determinism() {
        let v = vector([0.9, 0.85, 0.2, 0.35, 0.95]);
        let a = detect_cross_layer_signals(&v);
        let b = detect_cross_layer_signals(&v);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.signal_type, y.signal_type);
            assert_eq!(x.source, y.source);
            assert_eq!(x.target, y.target);
            assert_eq!(x.strength, y.strength);
            assert_eq!(x.message, y.message);
        }
    }

    #[test]
    fn test_quiet_vector_emits_nothing() {
        let signals = detect_cross_layer_signals(&vector([0.6, 0.6, 0.6, 0.6, 0.6]));
        assert!(signals.is_empty());
    }
}
