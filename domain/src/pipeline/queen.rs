//! The Queen decision policy
//!
//! A pure function from the round's critique artifacts, plan state and
//! budget to one of accept / rerun / rerun_local / downgrade / stop.

use super::tradition::CulturalTradition;
use crate::evaluation::layer::Layer;
use crate::evaluation::score::CandidateScore;
use crate::plan::fixit::FixItPlan;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Terminal and non-terminal decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueenAction {
    /// Accept the best candidate; terminal.
    Accept,
    /// Run a full Draft -> Critic cycle.
    Rerun,
    /// Refine the best candidate in place and re-enter Critic.
    RerunLocal,
    /// Terminal acceptance of a sub-threshold result.
    Downgrade,
    /// Terminal rejection.
    Stop,
}

impl QueenAction {
    pub fn as_str(&self) -> &str {
        match self {
            QueenAction::Accept => "accept",
            QueenAction::Rerun => "rerun",
            QueenAction::RerunLocal => "rerun_local",
            QueenAction::Downgrade => "downgrade",
            QueenAction::Stop => "stop",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueenAction::Accept | QueenAction::Downgrade | QueenAction::Stop
        )
    }
}

impl std::fmt::Display for QueenAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concrete decision with its reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueenDecision {
    pub action: QueenAction,
    pub reason: String,
    pub rerun_dimensions: Vec<Layer>,
    pub candidate_id: Option<String>,
}

impl QueenDecision {
    fn terminal(action: QueenAction, reason: impl Into<String>, candidate_id: Option<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
            rerun_dimensions: Vec::new(),
            candidate_id,
        }
    }
}

/// Image budget view the policy decides against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub image_spent_usd: f64,
    pub image_ceiling_usd: f64,
    pub next_round_cost_usd: f64,
}

impl BudgetStatus {
    pub fn can_afford_next_round(&self) -> bool {
        self.image_spent_usd + self.next_round_cost_usd <= self.image_ceiling_usd + 1e-9
    }
}

/// Everything the policy is allowed to look at for one decision.
#[derive(Debug, Clone)]
pub struct QueenInput<'a> {
    pub best: Option<&'a CandidateScore>,
    pub fixit_plan: Option<&'a FixItPlan>,
    pub rerun_hint: &'a [Layer],
    pub pending_rerun: &'a [Layer],
    pub tradition: CulturalTradition,
    pub round: u32,
    pub budget: BudgetStatus,
}

/// Decision thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueenPolicy {
    pub max_rounds: u32,
    /// At the round/budget limit, a best total at or above this downgrades
    /// instead of stopping.
    pub downgrade_threshold: f64,
    /// A fix-it plan with more items than this forces a full rerun.
    pub max_local_fix_items: usize,
}

impl Default for QueenPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            downgrade_threshold: 0.45,
            max_local_fix_items: 2,
        }
    }
}

impl QueenPolicy {
    /// Decide the fate of the current round. Pure: no I/O, no clock.
    pub fn decide(&self, input: &QueenInput<'_>) -> QueenDecision {
        // A gate-passed best candidate wins immediately.
        if let Some(best) = input.best {
            if best.gate_passed {
                return QueenDecision::terminal(
                    QueenAction::Accept,
                    format!(
                        "candidate {} passed the gate with weighted total {:.3}",
                        best.candidate_id,
                        best.weighted_total()
                    ),
                    Some(best.candidate_id.clone()),
                );
            }
        }

        let limit_reached =
            input.round >= self.max_rounds || !input.budget.can_afford_next_round();
        if limit_reached {
            let limit = if input.round >= self.max_rounds {
                "round limit"
            } else {
                "image budget"
            };
            return match input.best {
                Some(best) if best.weighted_total() >= self.downgrade_threshold => {
                    QueenDecision::terminal(
                        QueenAction::Downgrade,
                        format!(
                            "{} reached; best total {:.3} above downgrade threshold {:.3}",
                            limit,
                            best.weighted_total(),
                            self.downgrade_threshold
                        ),
                        Some(best.candidate_id.clone()),
                    )
                }
                _ => QueenDecision::terminal(
                    QueenAction::Stop,
                    format!("{} reached with no acceptable candidate", limit),
                    None,
                ),
            };
        }

        // Non-terminal: local repair when the damage is narrow and the
        // tradition permits inpainting, otherwise a full rerun.
        let local_allowed = input.tradition.allows_local_rerun();
        if let (Some(fixit), Some(best)) = (input.fixit_plan, input.best) {
            if local_allowed && fixit.items.len() <= self.max_local_fix_items {
                let dims: BTreeSet<Layer> = fixit
                    .target_layers()
                    .into_iter()
                    .chain(input.pending_rerun.iter().copied())
                    .collect();
                return QueenDecision {
                    action: QueenAction::RerunLocal,
                    reason: format!(
                        "{} narrow weakness(es) on candidate {}; targeted repair",
                        fixit.items.len(),
                        best.candidate_id
                    ),
                    rerun_dimensions: dims.into_iter().collect(),
                    candidate_id: Some(best.candidate_id.clone()),
                };
            }
        }

        let dims: BTreeSet<Layer> = input
            .rerun_hint
            .iter()
            .chain(input.pending_rerun.iter())
            .copied()
            .collect();
        let reason = if local_allowed {
            "no candidate passed the gate; full rerun".to_string()
        } else {
            format!(
                "no candidate passed the gate; {} forbids local edits, full rerun",
                input.tradition.display_name()
            )
        };
        QueenDecision {
            action: QueenAction::Rerun,
            reason,
            rerun_dimensions: dims.into_iter().collect(),
            candidate_id: None,
        }
    }
}
