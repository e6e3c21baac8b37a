//! Exploration tools backed by the run's evidence pack and analysis board
//!
//! Three tools: full-text search over the evidence, a term lookup, and a
//! read of another layer's published analysis. Argument problems come back
//! as failed results so the model can self-correct.

use async_trait::async_trait;
use atelier_application::ports::{ToolExecutorError, ToolExecutorPort};
use atelier_domain::{AnalysisBoard, EvidencePack, Layer, ToolCall, ToolDefinition, ToolParameter, ToolResult};
use tracing::debug;

pub const EVIDENCE_SEARCH: &str = "evidence_search";
pub const TERMINOLOGY_LOOKUP: &str = "terminology_lookup";
pub const READ_LAYER_ANALYSIS: &str = "read_layer_analysis";

/// Max items rendered per search.
const SEARCH_RESULT_LIMIT: usize = 5;

pub struct CriticToolbox {
    evidence: EvidencePack,
    board: AnalysisBoard,
}

impl CriticToolbox {
    pub fn new(evidence: EvidencePack, board: AnalysisBoard) -> Self {
        Self { evidence, board }
    }

    fn evidence_search(&self, call: &ToolCall) -> ToolResult {
        let query = match call.require_string("query") {
            Ok(q) => q,
            Err(message) => return ToolResult::error(EVIDENCE_SEARCH, message),
        };
        let hits = self.evidence.search(query);
        debug!(query, hits = hits.len(), "evidence search");
        if hits.is_empty() {
            return ToolResult::ok(
                EVIDENCE_SEARCH,
                format!("no evidence items match '{query}'"),
            );
        }
        let rendered: Vec<String> = hits
            .iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(|item| format!("[{}] {}", item.source, item.claim))
            .collect();
        ToolResult::ok(EVIDENCE_SEARCH, rendered.join("\n"))
    }

    fn terminology_lookup(&self, call: &ToolCall) -> ToolResult {
        let term = match call.require_string("term") {
            Ok(t) => t,
            Err(message) => return ToolResult::error(TERMINOLOGY_LOOKUP, message),
        };
        match self.evidence.lookup_term(term) {
            Some(item) => ToolResult::ok(
                TERMINOLOGY_LOOKUP,
                format!("{term}: {} (source: {})", item.claim, item.source),
            ),
            None => ToolResult::error(
                TERMINOLOGY_LOOKUP,
                format!("term '{term}' not found in the evidence pack"),
            ),
        }
    }

    fn read_layer_analysis(&self, call: &ToolCall) -> ToolResult {
        let name = match call.require_string("layer") {
            Ok(l) => l,
            Err(message) => return ToolResult::error(READ_LAYER_ANALYSIS, message),
        };
        let layer: Layer = match name.parse() {
            Ok(layer) => layer,
            Err(_) => {
                return ToolResult::error(
                    READ_LAYER_ANALYSIS,
                    format!("unknown layer '{name}'"),
                )
            }
        };
        match self.board.get(layer) {
            Some(text) => ToolResult::ok(READ_LAYER_ANALYSIS, text),
            None => ToolResult::ok(
                READ_LAYER_ANALYSIS,
                format!("no analysis published yet for {}", layer.as_str()),
            ),
        }
    }
}

#[async_trait]
impl ToolExecutorPort for CriticToolbox {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                EVIDENCE_SEARCH,
                "Search the gathered reference material by keyword",
            )
            .with_parameter(ToolParameter::new("query", "Search query", true)),
            ToolDefinition::new(
                TERMINOLOGY_LOOKUP,
                "Look up a cultural or art-historical term in the evidence pack",
            )
            .with_parameter(ToolParameter::new("term", "Term to look up", true)),
            ToolDefinition::new(
                READ_LAYER_ANALYSIS,
                "Read the published analysis of another evaluation dimension",
            )
            .with_parameter(ToolParameter::new(
                "layer",
                "Dimension name, e.g. 'visual_form' or 'L3'",
                true,
            )),
        ]
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolExecutorError> {
        match call.tool_name.as_str() {
            EVIDENCE_SEARCH => Ok(self.evidence_search(call)),
            TERMINOLOGY_LOOKUP => Ok(self.terminology_lookup(call)),
            READ_LAYER_ANALYSIS => Ok(self.read_layer_analysis(call)),
            other => Err(ToolExecutorError::UnknownTool(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_domain::EvidenceItem;

    fn toolbox() -> CriticToolbox {
        let evidence = EvidencePack::new("ev-1", "winter heron").with_items(
            vec![
                EvidenceItem::new("treatise", "herons embody patience in ink wash painting")
                    .with_terms(vec!["heron".to_string(), "patience".to_string()]),
                EvidenceItem::new("catalog", "negative space carries meaning")
                    .with_terms(vec!["ma".to_string()]),
            ],
            0.6,
        );
        let board = AnalysisBoard::new();
        board.record(Layer::VisualForm, "confident brushwork, tonal restraint");
        CriticToolbox::new(evidence, board)
    }

    #[tokio::test]
    async fn test_evidence_search_renders_hits() {
        let result = toolbox()
            .execute(&ToolCall::new(EVIDENCE_SEARCH).with_arg("query", "patience"))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("treatise"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_a_failed_result() {
        let result = toolbox()
            .execute(&ToolCall::new(EVIDENCE_SEARCH))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("query"));
    }

    #[tokio::test]
    async fn test_terminology_lookup_miss() {
        let result = toolbox()
            .execute(&ToolCall::new(TERMINOLOGY_LOOKUP).with_arg("term", "fox"))
            .await
            .unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_read_layer_analysis_accepts_codes() {
        let result = toolbox()
            .execute(&ToolCall::new(READ_LAYER_ANALYSIS).with_arg("layer", "L1"))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("brushwork"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let outcome = toolbox().execute(&ToolCall::new("write_file")).await;
        assert!(matches!(outcome, Err(ToolExecutorError::UnknownTool(_))));
    }
}
