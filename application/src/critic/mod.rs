//! The critic stage: deterministic baseline plus agent escalation.

pub mod engine;
pub mod rule_engine;

pub use engine::{CriticEngine, CritiqueInput, CritiqueOutput, RERUN_HINT_SCORE};
pub use rule_engine::{RuleBaseline, RuleEngine};
