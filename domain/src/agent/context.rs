//! Context handed to one agent evaluation

use crate::evaluation::layer::Layer;
use serde::{Deserialize, Serialize};

/// Everything a single escalated evaluation is allowed to see.
///
/// Immutable once passed to the runtime. Progressive-mode escalations carry
/// the rendered analyses of all previously completed layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentContext {
    pub task_id: String,
    pub candidate_id: String,
    pub layer: Layer,
    pub candidate_summary: String,
    pub evidence_summary: String,
    pub image_ref: Option<String>,
    pub locked_layers: Vec<Layer>,
    pub prior_analyses: Vec<(Layer, String)>,
}

impl AgentContext {
    pub fn new(
        task_id: impl Into<String>,
        candidate_id: impl Into<String>,
        layer: Layer,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            candidate_id: candidate_id.into(),
            layer,
            candidate_summary: String::new(),
            evidence_summary: String::new(),
            image_ref: None,
            locked_layers: Vec::new(),
            prior_analyses: Vec::new(),
        }
    }

    pub fn with_candidate_summary(mut self, summary: impl Into<String>) -> Self {
        self.candidate_summary = summary.into();
        self
    }

    pub fn with_evidence_summary(mut self, summary: impl Into<String>) -> Self {
        self.evidence_summary = summary.into();
        self
    }

    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    pub fn with_locked_layers(mut self, layers: Vec<Layer>) -> Self {
        self.locked_layers = layers;
        self
    }

    pub fn with_prior_analyses(mut self, analyses: Vec<(Layer, String)>) -> Self {
        self.prior_analyses = analyses;
        self
    }

    /// Render the opening user message for the evaluation transcript.
    pub fn render_briefing(&self) -> String {
        let mut briefing = format!(
            "Evaluate the {} ({}) dimension of candidate {}.\n\nCandidate:\n{}\n\nEvidence:\n{}\n",
            self.layer.display_name(),
            self.layer.code(),
            self.candidate_id,
            self.candidate_summary,
            self.evidence_summary,
        );
        if !self.locked_layers.is_empty() {
            let locked: Vec<&str> = self.locked_layers.iter().map(|l| l.as_str()).collect();
            briefing.push_str(&format!(
                "\nThe following dimensions are human-locked and must not influence your score: {}\n",
                locked.join(", ")
            ));
        }
        if !self.prior_analyses.is_empty() {
            briefing.push_str("\nCompleted layer analyses so far:\n");
            for (layer, text) in &self.prior_analyses {
                briefing.push_str(&format!("[{}] {}\n", layer.code(), text));
            }
        }
        briefing.push_str(
            "\nUse the available tools to ground your judgement, then call submit_evaluation \
             with your final score, confidence and rationale.",
        );
        briefing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_briefing_includes_prior_analyses() {
        let ctx = AgentContext::new("task-1", "cand-1", Layer::CulturalContext)
            .with_candidate_summary("ink wash landscape")
            .with_evidence_summary("3 reference items")
            .with_prior_analyses(vec![(Layer::VisualForm, "confident brushwork".to_string())]);

        let briefing = ctx.render_briefing();
        assert!(briefing.contains("Cultural Context"));
        assert!(briefing.contains("[L1] confident brushwork"));
        assert!(briefing.contains("submit_evaluation"));
    }

    #[test]
    fn test_briefing_mentions_locked_layers() {
        let ctx = AgentContext::new("task-1", "cand-1", Layer::PhilosophicalDepth)
            .with_locked_layers(vec![Layer::CulturalContext]);
        assert!(ctx.render_briefing().contains("cultural_context"));
    }
}
