//! Per-run planning state accumulated by the critic and human actions

use crate::evaluation::layer::Layer;
use crate::evaluation::signal::CrossLayerSignal;
use crate::pipeline::human::HumanAction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A recorded human override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanOverride {
    pub round: u32,
    pub action: HumanAction,
}

/// Cross-layer signals, human locks and pending rerun requests for one run.
///
/// Accumulates monotonically: nothing recorded here is removed mid-run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanState {
    signals: Vec<CrossLayerSignal>,
    locked_dimensions: BTreeSet<Layer>,
    override_history: Vec<HumanOverride>,
    pending_rerun: BTreeSet<Layer>,
}

impl PlanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_signals(&mut self, signals: impl IntoIterator<Item = CrossLayerSignal>) {
        self.signals.extend(signals);
    }

    pub fn signals(&self) -> &[CrossLayerSignal] {
        &self.signals
    }

    pub fn lock_dimensions(&mut self, layers: impl IntoIterator<Item = Layer>) {
        self.locked_dimensions.extend(layers);
    }

    pub fn is_locked(&self, layer: Layer) -> bool {
        self.locked_dimensions.contains(&layer)
    }

    pub fn locked_dimensions(&self) -> Vec<Layer> {
        self.locked_dimensions.iter().copied().collect()
    }

    pub fn request_rerun(&mut self, layers: impl IntoIterator<Item = Layer>) {
        self.pending_rerun.extend(layers);
    }

    pub fn pending_rerun_dimensions(&self) -> Vec<Layer> {
        self.pending_rerun.iter().copied().collect()
    }

    /// Record a human action, folding its side effects into the state.
    pub fn record_override(&mut self, round: u32, action: &HumanAction) {
        match action {
            HumanAction::LockDimensions { dimensions } => {
                self.lock_dimensions(dimensions.iter().copied());
            }
            HumanAction::Rerun { rerun_dimensions } => {
                self.request_rerun(rerun_dimensions.iter().copied());
            }
            _ => {}
        }
        self.override_history.push(HumanOverride {
            round,
            action: action.clone(),
        });
    }

    pub fn override_history(&self) -> &[HumanOverride] {
        &self.override_history
    }

    pub fn summary(&self) -> PlanStateSummary {
        PlanStateSummary {
            signal_count: self.signals.len(),
            locked_dimensions: self.locked_dimensions(),
            pending_rerun: self.pending_rerun_dimensions(),
            override_count: self.override_history.len(),
        }
    }
}

/// Compact snapshot of the plan state, attached to `human_required` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStateSummary {
    pub signal_count: usize,
    pub locked_dimensions: Vec<Layer>,
    pub pending_rerun: Vec<Layer>,
    pub override_count: usize,
}
