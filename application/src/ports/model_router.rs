//! Model router port
//!
//! Maps an evaluation layer to a concrete model and keeps the LLM cost
//! ledger. Selection is None when the budget cannot cover another call.

use atelier_domain::{Layer, ModelChoice};

pub trait ModelRouterPort: Send + Sync {
    /// Pick a model for an escalation. `requires_vision` forces a
    /// vision-capable model; returns None when no affordable model exists.
    fn select_model(&self, layer: Layer, requires_vision: bool) -> Option<ModelChoice>;

    /// Record spend against the LLM budget.
    fn record_cost(&self, cost_usd: f64);

    /// Total LLM spend so far.
    fn total_cost(&self) -> f64;
}
