//! Human-in-the-loop actions

use crate::evaluation::layer::Layer;
use serde::{Deserialize, Serialize};

/// An action submitted by a human reviewer while a run is paused.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HumanAction {
    /// Proceed with the queen's decision as-is.
    Approve,
    /// Abort the run.
    Reject { reason: Option<String> },
    /// Force a full rerun, optionally naming the dimensions that motivated it.
    Rerun {
        #[serde(default)]
        rerun_dimensions: Vec<Layer>,
    },
    /// Freeze the named dimensions: their scores are carried forward verbatim
    /// on subsequent critic passes.
    LockDimensions { dimensions: Vec<Layer> },
    /// Accept immediately, optionally overriding the chosen candidate.
    ForceAccept { candidate_id: Option<String> },
}

impl HumanAction {
    pub fn as_str(&self) -> &str {
        match self {
            HumanAction::Approve => "approve",
            HumanAction::Reject { .. } => "reject",
            HumanAction::Rerun { .. } => "rerun",
            HumanAction::LockDimensions { .. } => "lock_dimensions",
            HumanAction::ForceAccept { .. } => "force_accept",
        }
    }
}
