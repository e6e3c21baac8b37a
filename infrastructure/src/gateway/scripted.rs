//! Scripted model gateway
//!
//! Replays a fixed queue of responses instead of calling a provider. Used by
//! the offline demo mode and the integration tests, where runs must be
//! deterministic and free.

use async_trait::async_trait;
use atelier_application::ports::{GatewayError, ModelGatewayPort, ModelRequest};
use atelier_domain::{ContentBlock, ModelResponse, StopReason};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::debug;

pub struct ScriptedGateway {
    responses: Mutex<VecDeque<ModelResponse>>,
}

impl ScriptedGateway {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    /// Gateway that always answers with a `submit_evaluation` call carrying
    /// the given verdict, whatever is asked.
    pub fn always_submitting(score: f64, confidence: f64, rationale: &str) -> Self {
        let template = submission_response(score, confidence, rationale);
        let mut queue = VecDeque::new();
        // Enough copies for any run the demo wiring can produce.
        for _ in 0..64 {
            queue.push_back(template.clone());
        }
        Self {
            responses: Mutex::new(queue),
        }
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().expect("script queue poisoned").len()
    }
}

#[async_trait]
impl ModelGatewayPort for ScriptedGateway {
    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse, GatewayError> {
        let next = self
            .responses
            .lock()
            .expect("script queue poisoned")
            .pop_front();
        match next {
            Some(response) => {
                debug!(model = %request.model, "scripted response served");
                Ok(response)
            }
            None => Err(GatewayError::RequestFailed(
                "scripted gateway exhausted".to_string(),
            )),
        }
    }
}

/// A response whose only content is a `submit_evaluation` tool call.
pub fn submission_response(score: f64, confidence: f64, rationale: &str) -> ModelResponse {
    let mut input = HashMap::new();
    input.insert("score".to_string(), serde_json::json!(score));
    input.insert("confidence".to_string(), serde_json::json!(confidence));
    input.insert("rationale".to_string(), serde_json::json!(rationale));
    ModelResponse {
        content: vec![ContentBlock::ToolUse {
            id: "scripted-1".to_string(),
            name: "submit_evaluation".to_string(),
            input,
        }],
        stop_reason: Some(StopReason::ToolUse),
        model: Some("scripted".to_string()),
        cost_usd: Some(0.0),
    }
}

/// A plain text response, useful for exercising the nudge path.
pub fn text_response(text: &str) -> ModelResponse {
    ModelResponse::from_text(text)
}
