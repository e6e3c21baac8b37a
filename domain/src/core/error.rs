//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Unknown cultural tradition: {0}")]
    UnknownTradition(String),

    #[error("Evaluation error: {0}")]
    EvaluationError(String),
}
