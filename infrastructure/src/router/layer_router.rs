//! Two-role model router
//!
//! Perception layers get the vision model, the interpretive layers get the
//! cheaper text model. The shared ledger cuts escalations off once the next
//! call would overrun the LLM budget.

use atelier_application::ports::ModelRouterPort;
use atelier_domain::{Layer, ModelChoice};
use std::sync::Mutex;
use tracing::debug;

pub struct LayerModelRouter {
    vision: ModelChoice,
    text: ModelChoice,
    budget_usd: f64,
    spent: Mutex<f64>,
}

impl LayerModelRouter {
    pub fn new(vision: ModelChoice, text: ModelChoice, budget_usd: f64) -> Self {
        Self {
            vision,
            text,
            budget_usd,
            spent: Mutex::new(0.0),
        }
    }

    pub fn remaining_budget(&self) -> f64 {
        (self.budget_usd - *self.spent.lock().expect("cost ledger poisoned")).max(0.0)
    }
}

impl ModelRouterPort for LayerModelRouter {
    fn select_model(&self, layer: Layer, requires_vision: bool) -> Option<ModelChoice> {
        let choice = if requires_vision {
            &self.vision
        } else {
            &self.text
        };
        let spent = *self.spent.lock().expect("cost ledger poisoned");
        if spent + choice.cost_per_call > self.budget_usd + 1e-9 {
            debug!(
                layer = %layer,
                spent,
                budget = self.budget_usd,
                "llm budget cannot cover another call"
            );
            return None;
        }
        Some(choice.clone())
    }

    fn record_cost(&self, cost_usd: f64) {
        *self.spent.lock().expect("cost ledger poisoned") += cost_usd;
    }

    fn total_cost(&self) -> f64 {
        *self.spent.lock().expect("cost ledger poisoned")
    }
}
