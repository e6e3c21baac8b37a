//! Tool-using evaluation agent
//!
//! Two-phase ReAct loop over a native tool-use gateway: an exploration phase
//! of up to `max_steps - 1` model round-trips, then one forced-submission
//! round. The only success exit is the model calling `submit_evaluation`;
//! every failure path degrades to a fallback result instead of erroring.

use crate::config::AgentConfig;
use crate::ports::{ModelGatewayPort, ModelRequest, ModelRouterPort, ToolChoice, ToolExecutorPort};
use atelier_domain::{
    sniff_image_mime, AgentContext, AgentResult, ImagePayload, LayerState, Message, ModelChoice,
    ToolCall, ToolDefinition, ToolParameter, ToolResult,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Only the most recent tool outputs survive into the forced round.
const FORCED_ROUND_TOOL_OUTPUTS: usize = 5;

/// Name of the terminal tool the model must call to finish an evaluation.
pub const SUBMIT_TOOL: &str = "submit_evaluation";

/// Definition of the terminal submission tool, owned by the runtime.
pub fn submit_tool_definition() -> ToolDefinition {
    ToolDefinition::new(
        SUBMIT_TOOL,
        "Submit your final evaluation for this dimension. Call this exactly once, \
         after you have gathered enough grounding.",
    )
    .with_parameter(
        ToolParameter::new("score", "Final score in [0, 1]", true).with_type("number"),
    )
    .with_parameter(
        ToolParameter::new("confidence", "Your confidence in the score, [0, 1]", true)
            .with_type("number"),
    )
    .with_parameter(ToolParameter::new(
        "rationale",
        "Short justification grounded in the evidence you inspected",
        true,
    ))
    .with_parameter(
        ToolParameter::new("evidence_refs", "Sources supporting the rationale", false)
            .with_type("array"),
    )
}

/// The escalated critic agent.
pub struct AgentRuntime {
    gateway: Arc<dyn ModelGatewayPort>,
    tools: Arc<dyn ToolExecutorPort>,
    router: Arc<dyn ModelRouterPort>,
    config: AgentConfig,
}

impl AgentRuntime {
    pub fn new(
        gateway: Arc<dyn ModelGatewayPort>,
        tools: Arc<dyn ToolExecutorPort>,
        router: Arc<dyn ModelRouterPort>,
        config: AgentConfig,
    ) -> Self {
        Self {
            gateway,
            tools,
            router,
            config,
        }
    }

    /// Evaluate one dimension of one candidate. Never errors: any internal
    /// failure comes back as `fallback_used = true`.
    #[tracing::instrument(skip(self, context), fields(layer = %context.layer, candidate = %context.candidate_id))]
    pub async fn evaluate(&self, context: &AgentContext) -> AgentResult {
        let started = Instant::now();
        let mut tool_calls: u32 = 0;
        let mut llm_calls: u32 = 0;
        let mut cost_usd: f64 = 0.0;

        let image = match &context.image_ref {
            Some(reference) if context.layer.requires_vision() => {
                resolve_image(reference).await
            }
            _ => None,
        };

        let Some(choice) = self
            .router
            .select_model(context.layer, image.is_some())
        else {
            warn!(layer = %context.layer, "no affordable model for escalation");
            return AgentResult::fallback("no affordable model")
                .with_usage(0, 0, 0.0, started.elapsed().as_millis() as u64);
        };

        let system = format!(
            "You are an art critic evaluating one dimension of a candidate work. \
             Ground every judgement in the provided evidence and tool output. \
             Finish by calling {SUBMIT_TOOL}."
        );

        let mut exploration_tools = self.tools.definitions();
        exploration_tools.push(submit_tool_definition());

        let mut messages = vec![Message::user(context.render_briefing())];
        let mut transcript_outputs: Vec<String> = Vec::new();

        // Exploration phase: the model may browse tools freely; submitting is
        // the only early exit.
        let exploration_rounds = self.config.max_steps.saturating_sub(1);
        for round in 0..exploration_rounds {
            let tool_choice = if round == 0 {
                ToolChoice::Required
            } else {
                ToolChoice::Auto
            };
            let mut request = ModelRequest::new(choice.model.clone(), system.clone())
                .with_messages(messages.clone())
                .with_tools(exploration_tools.clone(), tool_choice);
            if let Some(payload) = &image {
                request = request.with_image(payload.clone());
            }

            let response = match self.gateway.invoke(request).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, "gateway failure during exploration");
                    self.router.record_cost(cost_usd);
                    return AgentResult::fallback(format!("gateway failure: {err}")).with_usage(
                        tool_calls,
                        llm_calls,
                        cost_usd,
                        started.elapsed().as_millis() as u64,
                    );
                }
            };
            llm_calls += 1;
            let call_cost = response.cost_usd.unwrap_or(choice.cost_per_call);
            cost_usd += call_cost;

            let text = response.text_content();
            if !text.is_empty() {
                messages.push(Message::assistant(text));
            }

            let calls = response.tool_calls();
            if calls.is_empty() {
                // Text-only turn: nudge back toward the tools.
                messages.push(Message::user(format!(
                    "Use the available tools to gather grounding, or call {SUBMIT_TOOL} \
                     with your final evaluation."
                )));
                continue;
            }

            for call in calls {
                if call.tool_name == SUBMIT_TOOL {
                    if let Some(result) = parse_submission(&call) {
                        self.router.record_cost(cost_usd);
                        return result.with_usage(
                            tool_calls,
                            llm_calls,
                            cost_usd,
                            started.elapsed().as_millis() as u64,
                        );
                    }
                    // Malformed submission: surface the problem as a tool
                    // result and keep exploring.
                    let rendered = ToolResult::error(
                        SUBMIT_TOOL,
                        "score must be a number in [0, 1] and rationale must be present",
                    )
                    .rendered();
                    messages.push(tool_result_message(&call, &rendered));
                    continue;
                }

                tool_calls += 1;
                let result = match self.tools.execute(&call).await {
                    Ok(result) => result,
                    Err(err) => ToolResult::error(&call.tool_name, err.to_string()),
                };
                let rendered = result.rendered();
                debug!(tool = %call.tool_name, ok = result.success, "tool executed");
                transcript_outputs.push(format!("[{}] {}", call.tool_name, rendered));
                messages.push(tool_result_message(&call, &rendered));
            }
        }

        // Forced submission: compact context, submit tool only.
        let recent: Vec<&String> = transcript_outputs
            .iter()
            .rev()
            .take(FORCED_ROUND_TOOL_OUTPUTS)
            .collect();
        let mut closing = context.render_briefing();
        if !recent.is_empty() {
            closing.push_str("\n\nYour most recent tool findings:\n");
            for line in recent.iter().rev() {
                closing.push_str(line);
                closing.push('\n');
            }
        }
        closing.push_str(&format!(
            "\nYou must now call {SUBMIT_TOOL} with your final evaluation."
        ));

        let mut request = ModelRequest::new(choice.model.clone(), system)
            .with_messages(vec![Message::user(closing)])
            .with_tools(vec![submit_tool_definition()], ToolChoice::Required);
        if let Some(payload) = &image {
            request = request.with_image(payload.clone());
        }

        let outcome = match self.gateway.invoke(request).await {
            Ok(response) => {
                llm_calls += 1;
                cost_usd += response.cost_usd.unwrap_or(choice.cost_per_call);
                response
                    .tool_calls()
                    .iter()
                    .find(|c| c.tool_name == SUBMIT_TOOL)
                    .and_then(parse_submission)
            }
            Err(err) => {
                warn!(error = %err, "gateway failure during forced submission");
                None
            }
        };

        self.router.record_cost(cost_usd);
        let latency_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Some(result) => result.with_usage(tool_calls, llm_calls, cost_usd, latency_ms),
            None => AgentResult::fallback("model never produced a usable submission")
                .with_usage(tool_calls, llm_calls, cost_usd, latency_ms),
        }
    }

    /// Evaluate and fold the outcome into the owning layer state.
    pub async fn evaluate_with_state(
        &self,
        context: &AgentContext,
        state: &mut LayerState,
    ) -> AgentResult {
        let result = self.evaluate(context).await;
        state.apply_agent_result(&result);
        result
    }

    /// The model actually used for a hypothetical escalation, for planning.
    pub fn planned_model(&self, context: &AgentContext) -> Option<ModelChoice> {
        let wants_vision = context.layer.requires_vision() && context.image_ref.is_some();
        self.router.select_model(context.layer, wants_vision)
    }
}

fn tool_result_message(call: &ToolCall, rendered: &str) -> Message {
    match &call.native_id {
        Some(id) => Message::tool_result(id.clone(), rendered),
        None => Message::user(format!("[{} result] {}", call.tool_name, rendered)),
    }
}

/// Parse a `submit_evaluation` call; None when required fields are missing.
fn parse_submission(call: &ToolCall) -> Option<AgentResult> {
    let score = call.get_f64("score")?;
    let confidence = call.get_f64("confidence").unwrap_or(0.5);
    let rationale = call.get_string("rationale").unwrap_or_default().to_string();
    if rationale.is_empty() {
        return None;
    }
    let evidence_refs = call.get_string_array("evidence_refs").unwrap_or_default();
    Some(AgentResult::submitted(score, confidence, rationale, evidence_refs))
}

/// Turn an image reference into a payload the gateway understands.
///
/// Data URIs and remote URLs pass through untouched; anything else is read
/// from disk with magic-byte MIME sniffing. Unreadable files degrade to a
/// text-only evaluation rather than failing the escalation.
async fn resolve_image(reference: &str) -> Option<ImagePayload> {
    if reference.starts_with("data:") {
        return Some(ImagePayload::DataUri {
            uri: reference.to_string(),
        });
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Some(ImagePayload::Url {
            url: reference.to_string(),
        });
    }
    match tokio::fs::read(reference).await {
        Ok(data) => {
            let mime = sniff_image_mime(&data)?;
            Some(ImagePayload::Bytes {
                data,
                mime: mime.to_string(),
            })
        }
        Err(err) => {
            warn!(path = reference, error = %err, "image unreadable, evaluating without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submission() {
        let call = ToolCall::new(SUBMIT_TOOL)
            .with_arg("score", 0.82)
            .with_arg("confidence", 0.9)
            .with_arg("rationale", "strong period-correct motifs")
            .with_arg("evidence_refs", serde_json::json!(["treatise"]));
        let result = parse_submission(&call).unwrap();
        assert!((result.score - 0.82).abs() < 1e-9);
        assert_eq!(result.evidence_refs, vec!["treatise".to_string()]);
        assert!(!result.fallback_used);
    }

    #[test]
    fn test_parse_submission_requires_score_and_rationale() {
        let no_score = ToolCall::new(SUBMIT_TOOL).with_arg("rationale", "r");
        assert!(parse_submission(&no_score).is_none());

        let no_rationale = ToolCall::new(SUBMIT_TOOL).with_arg("score", 0.5);
        assert!(parse_submission(&no_rationale).is_none());
    }

    #[test]
    fn test_submit_tool_schema() {
        let def = submit_tool_definition();
        let schema = def.input_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&serde_json::json!("score")));
        assert!(required.contains(&serde_json::json!("rationale")));
        assert!(!required.contains(&serde_json::json!("evidence_refs")));
    }

    #[tokio::test]
    async fn test_resolve_image_passthrough() {
        let data_uri = resolve_image("data:image/png;base64,AAAA").await.unwrap();
        assert!(matches!(data_uri, ImagePayload::DataUri { .. }));

        let url = resolve_image("https://example.test/c.png").await.unwrap();
        assert!(matches!(url, ImagePayload::Url { .. }));

        assert!(resolve_image("/nonexistent/path.png").await.is_none());
    }
}
