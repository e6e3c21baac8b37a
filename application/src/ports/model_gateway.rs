//! Model gateway port
//!
//! Defines the interface for invoking LLM providers with native tool use.
//! Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use atelier_domain::{ImagePayload, Message, Model, ModelResponse, ToolDefinition};
use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// How strongly tool use is requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model may answer with text or call tools.
    Auto,
    /// The model must call one of the offered tools.
    Required,
}

/// One fully-assembled model invocation.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: Model,
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: ToolChoice,
    pub image: Option<ImagePayload>,
}

impl ModelRequest {
    pub fn new(model: Model, system: impl Into<String>) -> Self {
        Self {
            model,
            system: system.into(),
            messages: Vec::new(),
            tools: Vec::new(),
            tool_choice: ToolChoice::Auto,
            image: None,
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>, choice: ToolChoice) -> Self {
        self.tools = tools;
        self.tool_choice = choice;
        self
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }
}

/// Gateway for model invocation with tool use
#[async_trait]
pub trait ModelGatewayPort: Send + Sync {
    /// Send a request and get the structured response.
    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse, GatewayError>;
}
