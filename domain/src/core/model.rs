//! Model value object representing an LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Available LLM models (Value Object)
///
/// A domain concept representing the models an escalated evaluation may be
/// routed to. Vision capability matters for the perception layers (L1-L2);
/// cost matters for the escalation budget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Gpt52,
    Gpt5Mini,
    ClaudeSonnet45,
    ClaudeHaiku45,
    Gemini3Pro,
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt52 => "gpt-5.2",
            Model::Gpt5Mini => "gpt-5-mini",
            Model::ClaudeSonnet45 => "claude-sonnet-4.5",
            Model::ClaudeHaiku45 => "claude-haiku-4.5",
            Model::Gemini3Pro => "gemini-3-pro-preview",
            Model::Custom(s) => s,
        }
    }

    /// Check if this model accepts image payloads
    pub fn supports_vision(&self) -> bool {
        matches!(
            self,
            Model::Gpt52 | Model::ClaudeSonnet45 | Model::Gemini3Pro
        )
    }
}

impl Default for Model {
    /// Returns the default text-evaluation model
    fn default() -> Self {
        Model::ClaudeHaiku45
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gpt-5.2" => Model::Gpt52,
            "gpt-5-mini" => Model::Gpt5Mini,
            "claude-sonnet-4.5" => Model::ClaudeSonnet45,
            "claude-haiku-4.5" => Model::ClaudeHaiku45,
            "gemini-3-pro-preview" => Model::Gemini3Pro,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().expect("Model::from_str is infallible"))
    }
}

/// A concrete model selection made by the routing policy.
///
/// Carries everything the agent runtime needs to account for the call:
/// the model itself, whether the image payload path is usable, and the
/// estimated cost of one round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelChoice {
    pub model: Model,
    pub supports_vision: bool,
    pub cost_per_call: f64,
}

impl ModelChoice {
    pub fn new(model: Model, cost_per_call: f64) -> Self {
        let supports_vision = model.supports_vision();
        Self {
            model,
            supports_vision,
            cost_per_call,
        }
    }
}
