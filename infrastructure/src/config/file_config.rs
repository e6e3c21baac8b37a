//! On-disk configuration schema
//!
//! Everything is optional in the file; missing sections fall back to the
//! built-in defaults so an empty `atelier.toml` is valid.

use atelier_application::PipelineConfig;
use atelier_domain::{Model, ModelChoice};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Model assignments for escalated evaluations.
///
/// Two roles: a vision-capable model for the perception layers and a cheaper
/// text model for everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub vision_model: String,
    pub vision_cost_per_call: f64,
    pub text_model: String,
    pub text_cost_per_call: f64,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            vision_model: "gemini-3-pro-preview".to_string(),
            vision_cost_per_call: 0.02,
            text_model: "claude-haiku-4.5".to_string(),
            text_cost_per_call: 0.005,
        }
    }
}

impl ModelsConfig {
    pub fn vision_choice(&self) -> ModelChoice {
        let model: Model = self.vision_model.parse().expect("model parse is infallible");
        ModelChoice::new(model, self.vision_cost_per_call)
    }

    pub fn text_choice(&self) -> ModelChoice {
        let model: Model = self.text_model.parse().expect("model parse is infallible");
        ModelChoice::new(model, self.text_cost_per_call)
    }
}

/// Where run state lands on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub checkpoint_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    /// JSONL pipeline event log, disabled when unset.
    pub event_log: Option<PathBuf>,
}

impl StorageConfig {
    /// Checkpoint directory, defaulting under the platform data dir.
    pub fn checkpoint_dir(&self) -> PathBuf {
        self.checkpoint_dir
            .clone()
            .unwrap_or_else(|| default_data_dir().join("checkpoints"))
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.archive_dir
            .clone()
            .unwrap_or_else(|| default_data_dir().join("archive"))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("atelier")
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub pipeline: PipelineConfig,
    pub models: ModelsConfig,
    pub storage: StorageConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_parses_to_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.pipeline.candidates_per_round, 3);
        assert_eq!(config.models.text_model, "claude-haiku-4.5");
        assert!(config.storage.event_log.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config: FileConfig = toml::from_str(
            r#"
            [pipeline]
            candidates_per_round = 5

            [pipeline.hitl]
            enabled = true
            timeout_secs = 60

            [models]
            vision_model = "gpt-5.2"
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.candidates_per_round, 5);
        assert!(config.pipeline.hitl.enabled);
        assert_eq!(config.pipeline.hitl.timeout_secs, 60);
        assert!(config.models.vision_choice().supports_vision);
        // Untouched sections keep their defaults.
        assert_eq!(config.pipeline.queen.max_rounds, 3);
    }

    #[test]
    fn test_model_choices_carry_costs() {
        let models = ModelsConfig::default();
        assert!(models.vision_choice().supports_vision);
        assert!(!models.text_choice().supports_vision);
        assert!(models.vision_choice().cost_per_call > models.text_choice().cost_per_call);
    }
}
