//! Targeted repair planning for the best candidate

use crate::evaluation::layer::Layer;
use crate::evaluation::score::ScoreVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dimension scoring below this gets a fix item.
pub const FIXIT_SCORE_THRESHOLD: f64 = 0.6;
/// At or above this many items the plan switches to full regeneration.
pub const FULL_REGENERATE_ITEM_COUNT: usize = 3;

/// Overall repair strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStrategy {
    FullRegenerate,
    TargetedInpaint,
}

impl FixStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            FixStrategy::FullRegenerate => "full_regenerate",
            FixStrategy::TargetedInpaint => "targeted_inpaint",
        }
    }
}

/// One targeted repair instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixItem {
    pub layer: Layer,
    pub issue: String,
    pub prompt_delta: String,
    pub mask_region: String,
    /// Ascending by dimension order: L1 fixes come first.
    pub priority: u8,
    pub current_score: f64,
}

/// Repair plan derived from the best candidate's merged scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixItPlan {
    pub items: Vec<FixItem>,
    pub overall_strategy: FixStrategy,
    pub estimated_improvement: f64,
    pub source_scores: BTreeMap<Layer, f64>,
}

impl FixItPlan {
    pub fn target_layers(&self) -> Vec<Layer> {
        self.items.iter().map(|i| i.layer).collect()
    }
}

/// Fixed per-layer repair table: (issue, prompt delta, mask region).
fn layer_fix_template(layer: Layer) -> (&'static str, &'static str, &'static str) {
    match layer {
        Layer::VisualForm => (
            "rendering quality below expectations",
            "sharper detail, coherent lighting, higher fidelity rendering",
            "full_canvas",
        ),
        Layer::Composition => (
            "weak compositional structure",
            "rebalance focal hierarchy, apply rule-of-thirds framing",
            "composition_grid",
        ),
        Layer::CulturalContext => (
            "insufficient grounding in the stated tradition",
            "foreground canonical motifs and period-correct materials of the tradition",
            "motif_regions",
        ),
        Layer::SymbolicMeaning => (
            "symbolic content thin or incoherent",
            "strengthen the central symbol and its supporting iconography",
            "focal_subject",
        ),
        Layer::PhilosophicalDepth => (
            "surface-level reading, little aesthetic depth",
            "introduce deliberate ambiguity and restraint to invite interpretation",
            "full_canvas",
        ),
    }
}

/// Derive a fix-it plan from a merged score vector.
///
/// Returns `None` when no dimension scores below the threshold. Items are
/// ordered by dimension (L1 first) with ascending priority.
pub fn derive_fixit_plan(scores: &ScoreVector) -> Option<FixItPlan> {
    let weak = scores.layers_below(FIXIT_SCORE_THRESHOLD);
    if weak.is_empty() {
        return None;
    }

    let items: Vec<FixItem> = weak
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let (issue, prompt_delta, mask_region) = layer_fix_template(*layer);
            FixItem {
                layer: *layer,
                issue: issue.to_string(),
                prompt_delta: prompt_delta.to_string(),
                mask_region: mask_region.to_string(),
                priority: i as u8 + 1,
                current_score: scores.get(*layer),
            }
        })
        .collect();

    let overall_strategy = if items.len() >= FULL_REGENERATE_ITEM_COUNT {
        FixStrategy::FullRegenerate
    } else {
        FixStrategy::TargetedInpaint
    };

    let estimated_improvement = items
        .iter()
        .map(|i| (FIXIT_SCORE_THRESHOLD - i.current_score) * 0.5)
        .sum();

    Some(FixItPlan {
        items,
        overall_strategy,
        estimated_improvement,
        source_scores: scores.as_map(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_plan_when_all_strong() {
        let scores = ScoreVector::new([0.8, 0.7, 0.9, 0.65, 0.6]);
        assert!(derive_fixit_plan(&scores).is_none());
    }

    #[test]
    fn test_single_weak_dimension() {
        // The scenario vector: only cultural_context (0.2) is below 0.6;
        // L4 at exactly 0.6 gets no item.
        let scores = ScoreVector::new([0.9, 0.85, 0.2, 0.6, 0.95]);
        let plan = derive_fixit_plan(&scores).unwrap();
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].layer, Layer::CulturalContext);
        assert_eq!(plan.items[0].priority, 1);
        assert_eq!(plan.overall_strategy, FixStrategy::TargetedInpaint);
        assert!(plan.estimated_improvement > 0.0);
    }

    #[test]
    fn test_full_regenerate_at_three_items() {
        let scores = ScoreVector::new([0.5, 0.4, 0.3, 0.9, 0.9]);
        let plan = derive_fixit_plan(&scores).unwrap();
        assert_eq!(plan.items.len(), 3);
        assert_eq!(plan.overall_strategy, FixStrategy::FullRegenerate);
        // Priority ascending in dimension order
        assert_eq!(plan.items[0].layer, Layer::VisualForm);
        assert_eq!(plan.items[2].layer, Layer::CulturalContext);
        assert!(plan.items[0].priority < plan.items[2].priority);
    }
}
