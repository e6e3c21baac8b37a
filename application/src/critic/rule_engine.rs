//! Deterministic rule baseline
//!
//! Scores every layer of a candidate from cheap observable features: the
//! draft collaborator's trait profile when present, otherwise prompt
//! richness, tradition lexicon overlap and evidence coverage. Never fails,
//! costs nothing, and is fully deterministic over its inputs.

use atelier_domain::{
    Candidate, CulturalTradition, EvidencePack, Layer, LayerState, RiskTag, Severity,
};

/// A dimension at or below this is tagged as collapsed (critical).
pub const CRITICAL_DIMENSION_SCORE: f64 = 0.1;
/// Evidence coverage below this draws a warning tag.
pub const THIN_EVIDENCE_COVERAGE: f64 = 0.3;

/// Rule confidence by layer: the baseline trusts itself on surface layers
/// and much less on interpretive ones, which is what drives escalation.
const RULE_CONFIDENCE: [f64; 5] = [0.70, 0.65, 0.45, 0.40, 0.35];

/// Baseline assessment of one candidate.
#[derive(Debug, Clone)]
pub struct RuleBaseline {
    /// One state per layer, in evaluation order.
    pub states: Vec<LayerState>,
    pub risk_tags: Vec<RiskTag>,
}

impl RuleBaseline {
    pub fn state(&self, layer: Layer) -> &LayerState {
        &self.states[layer.index()]
    }
}

/// Stateless rule scorer.
pub struct RuleEngine;

impl RuleEngine {
    /// Score all five layers of a candidate.
    pub fn assess(
        candidate: &Candidate,
        evidence: &EvidencePack,
        tradition: CulturalTradition,
    ) -> RuleBaseline {
        let overlap = motif_overlap(&candidate.prompt, tradition);
        let richness = prompt_richness(&candidate.prompt);
        let coverage = evidence.coverage;

        let mut states = Vec::with_capacity(Layer::ALL.len());
        for layer in Layer::ALL {
            let (score, source) = match candidate.trait_profile.get(&layer) {
                Some(value) => (*value, "trait profile"),
                None => (feature_score(layer, overlap, richness, coverage), "features"),
            };
            let confidence = base_confidence(layer, candidate);
            let mut state = LayerState::new(layer, score, confidence);
            state.add_analysis(format!(
                "rule baseline ({source}): score {:.2}, motif overlap {:.2}, coverage {:.2}",
                state.score, overlap, coverage
            ));
            states.push(state);
        }

        let mut risk_tags = Vec::new();
        for state in &states {
            if state.score <= CRITICAL_DIMENSION_SCORE {
                risk_tags.push(RiskTag::new(
                    "collapsed_dimension",
                    format!("{} scored {:.2}; the dimension is absent", state.layer, state.score),
                    Severity::Critical,
                ));
            }
        }
        if coverage < THIN_EVIDENCE_COVERAGE {
            risk_tags.push(RiskTag::new(
                "thin_evidence",
                format!("evidence coverage {:.2} is too thin to trust grounding scores", coverage),
                Severity::Warning,
            ));
        }
        if overlap == 0.0 {
            risk_tags.push(RiskTag::new(
                "no_tradition_motifs",
                format!("prompt engages none of the {} lexicon", tradition.display_name()),
                Severity::Info,
            ));
        }

        RuleBaseline { states, risk_tags }
    }
}

/// Fraction of the tradition's motif lexicon present in the prompt.
fn motif_overlap(prompt: &str, tradition: CulturalTradition) -> f64 {
    let lower = prompt.to_lowercase();
    let terms = tradition.motif_terms();
    if terms.is_empty() {
        return 0.0;
    }
    let matched = terms.iter().filter(|t| lower.contains(**t)).count();
    matched as f64 / terms.len() as f64
}

/// Word-count proxy for prompt specificity, saturating at 24 words.
fn prompt_richness(prompt: &str) -> f64 {
    (prompt.split_whitespace().count() as f64 / 24.0).min(1.0)
}

fn feature_score(layer: Layer, overlap: f64, richness: f64, coverage: f64) -> f64 {
    match layer {
        Layer::VisualForm => 0.45 + 0.35 * richness,
        Layer::Composition => 0.40 + 0.30 * richness + 0.10 * overlap,
        Layer::CulturalContext => 0.25 + 0.45 * overlap + 0.20 * coverage,
        Layer::SymbolicMeaning => 0.30 + 0.35 * overlap + 0.15 * coverage,
        Layer::PhilosophicalDepth => 0.30 + 0.25 * overlap + 0.15 * coverage,
    }
}

fn base_confidence(layer: Layer, candidate: &Candidate) -> f64 {
    let mut confidence = RULE_CONFIDENCE[layer.index()];
    if candidate.trait_profile.contains_key(&layer) {
        confidence += 0.10;
    }
    confidence.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_domain::EvidenceItem;

    fn pack(coverage: f64) -> EvidencePack {
        EvidencePack::new("ev-1", "heron").with_items(
            vec![EvidenceItem::new("treatise", "herons symbolize patience")],
            coverage,
        )
    }

    #[test]
    fn test_trait_profile_wins_over_features() {
        let candidate = Candidate::new("c1", "a heron in mist, ink and brush", 42)
            .with_trait(Layer::CulturalContext, 0.2);
        let baseline = RuleEngine::assess(&candidate, &pack(0.6), CulturalTradition::InkWash);
        assert!((baseline.state(Layer::CulturalContext).score - 0.2).abs() < 1e-9);
        assert!(baseline
            .state(Layer::CulturalContext)
            .analysis_text()
            .contains("trait profile"));
    }

    #[test]
    fn test_deterministic() {
        let candidate = Candidate::new("c1", "a heron in mist, ink wash, bamboo shore", 42);
        let a = RuleEngine::assess(&candidate, &pack(0.6), CulturalTradition::InkWash);
        let b = RuleEngine::assess(&candidate, &pack(0.6), CulturalTradition::InkWash);
        for layer in Layer::ALL {
            assert_eq!(a.state(layer).score, b.state(layer).score);
        }
    }

    #[test]
    fn test_motif_overlap_raises_grounding_layers() {
        let plain = Candidate::new("c1", "a bird on water at dusk somewhere quiet", 1);
        let grounded = Candidate::new("c2", "ink wash heron, brush strokes, mist over bamboo", 1);
        let evidence = pack(0.6);
        let a = RuleEngine::assess(&plain, &evidence, CulturalTradition::InkWash);
        let b = RuleEngine::assess(&grounded, &evidence, CulturalTradition::InkWash);
        assert!(
            b.state(Layer::CulturalContext).score > a.state(Layer::CulturalContext).score
        );
    }

    #[test]
    fn test_risk_tags() {
        let candidate = Candidate::new("c1", "a bird", 1).with_trait(Layer::PhilosophicalDepth, 0.05);
        let baseline = RuleEngine::assess(&candidate, &pack(0.1), CulturalTradition::Ukiyoe);
        assert!(baseline
            .risk_tags
            .iter()
            .any(|t| t.code == "collapsed_dimension" && t.is_critical()));
        assert!(baseline.risk_tags.iter().any(|t| t.code == "thin_evidence"));
        assert!(baseline.risk_tags.iter().any(|t| t.code == "no_tradition_motifs"));
    }

    #[test]
    fn test_scenario_profile_has_no_critical_tag() {
        // The L3-weak scenario candidate (0.2 cultural context) must not be
        // blocked by a critical tag; 0.2 is weak, not absent.
        let candidate = Candidate::new("c1", "ukiyo-e wave print", 1)
            .with_trait(Layer::VisualForm, 0.9)
            .with_trait(Layer::Composition, 0.85)
            .with_trait(Layer::CulturalContext, 0.2)
            .with_trait(Layer::SymbolicMeaning, 0.6)
            .with_trait(Layer::PhilosophicalDepth, 0.95);
        let baseline = RuleEngine::assess(&candidate, &pack(0.8), CulturalTradition::Ukiyoe);
        assert!(!baseline.risk_tags.iter().any(|t| t.is_critical()));
    }
}
