//! Evidence gap reporting

use crate::evaluation::layer::Layer;
use crate::evaluation::score::ScoreVector;
use crate::pipeline::tradition::CulturalTradition;
use serde::{Deserialize, Serialize};

/// Coverage below this makes an evidence request possible.
pub const EVIDENCE_COVERAGE_THRESHOLD: f64 = 0.7;
/// A dimension below this counts as evidence-starved.
pub const WEAK_DIMENSION_SCORE: f64 = 0.5;

/// How urgently the evidence-gathering collaborator should act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

/// Request for supplementary evidence, consumed by the scout collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedMoreEvidence {
    pub gaps: Vec<String>,
    pub suggested_queries: Vec<String>,
    pub target_layers: Vec<Layer>,
    pub urgency: Urgency,
    pub coverage_before: f64,
}

fn layer_gap_description(layer: Layer) -> &'static str {
    match layer {
        Layer::VisualForm => "no reference imagery for the expected rendering style",
        Layer::Composition => "no compositional exemplars from the tradition",
        Layer::CulturalContext => "canonical sources for the tradition are missing",
        Layer::SymbolicMeaning => "iconography of the central motifs is undocumented",
        Layer::PhilosophicalDepth => "aesthetic treatises for the tradition are absent",
    }
}

/// Derive an evidence request, or `None` when coverage and scores are healthy.
///
/// Produced only when coverage is below [`EVIDENCE_COVERAGE_THRESHOLD`] and at
/// least one dimension is below [`WEAK_DIMENSION_SCORE`]. Urgency: high with
/// three or more gaps or coverage below 0.3; medium with two gaps or coverage
/// below 0.5; low otherwise.
pub fn derive_evidence_request(
    scores: &ScoreVector,
    coverage: f64,
    subject: &str,
    tradition: &CulturalTradition,
) -> Option<NeedMoreEvidence> {
    if coverage >= EVIDENCE_COVERAGE_THRESHOLD {
        return None;
    }
    let target_layers = scores.layers_below(WEAK_DIMENSION_SCORE);
    if target_layers.is_empty() {
        return None;
    }

    let gaps: Vec<String> = target_layers
        .iter()
        .map(|l| layer_gap_description(*l).to_string())
        .collect();

    let suggested_queries: Vec<String> = target_layers
        .iter()
        .map(|l| {
            format!(
                "{} {} {}",
                tradition.display_name(),
                subject,
                l.display_name().to_lowercase()
            )
        })
        .collect();

    let urgency = if gaps.len() >= 3 || coverage < 0.3 {
        Urgency::High
    } else if gaps.len() >= 2 || coverage < 0.5 {
        Urgency::Medium
    } else {
        Urgency::Low
    };

    Some(NeedMoreEvidence {
        gaps,
        suggested_queries,
        target_layers,
        urgency,
        coverage_before: coverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_coverage_yields_none() {
        let scores = ScoreVector::new([0.2, 0.2, 0.2, 0.2, 0.2]);
        assert!(derive_evidence_request(&scores, 0.8, "heron", &CulturalTradition::InkWash).is_none());
    }

    #[test]
    fn test_no_weak_dimension_yields_none() {
        let scores = ScoreVector::new([0.6, 0.6, 0.6, 0.6, 0.6]);
        assert!(derive_evidence_request(&scores, 0.4, "heron", &CulturalTradition::InkWash).is_none());
    }

    #[test]
    fn test_urgency_ladder() {
        let one_gap = ScoreVector::new([0.9, 0.9, 0.4, 0.9, 0.9]);
        let req = derive_evidence_request(&one_gap, 0.6, "heron", &CulturalTradition::Ukiyoe).unwrap();
        assert_eq!(req.urgency, Urgency::Low);

        let req = derive_evidence_request(&one_gap, 0.45, "heron", &CulturalTradition::Ukiyoe).unwrap();
        assert_eq!(req.urgency, Urgency::Medium);

        let three_gaps = ScoreVector::new([0.4, 0.4, 0.4, 0.9, 0.9]);
        let req = derive_evidence_request(&three_gaps, 0.6, "heron", &CulturalTradition::Ukiyoe).unwrap();
        assert_eq!(req.urgency, Urgency::High);

        let req = derive_evidence_request(&one_gap, 0.2, "heron", &CulturalTradition::Ukiyoe).unwrap();
        assert_eq!(req.urgency, Urgency::High);
    }

    #[test]
    fn test_queries_mention_tradition_and_subject() {
        let scores = ScoreVector::new([0.9, 0.9, 0.3, 0.9, 0.9]);
        let req = derive_evidence_request(&scores, 0.5, "winter heron", &CulturalTradition::InkWash)
            .unwrap();
        assert_eq!(req.target_layers, vec![Layer::CulturalContext]);
        assert!(req.suggested_queries[0].contains("winter heron"));
        assert!(req.suggested_queries[0].contains("Ink Wash"));
        assert!((req.coverage_before - 0.5).abs() < 1e-9);
    }
}
