//! Sync/async bridge for embedding callers
//!
//! Hosts a small dedicated runtime so synchronous code can request an
//! evaluation without nesting schedulers. Calls are bounded by a hard
//! timeout and degrade to a fallback result instead of blocking forever.

use crate::agent::AgentRuntime;
use atelier_domain::{AgentContext, AgentResult};
use std::time::Duration;
use tracing::warn;

/// Upper bound on any bridged evaluation.
pub const BRIDGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Synchronous facade over [`AgentRuntime`].
pub struct SyncEvaluationBridge {
    runtime: tokio::runtime::Runtime,
}

impl SyncEvaluationBridge {
    /// Build the bridge with its own two-worker runtime.
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("atelier-bridge")
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    /// Blocking evaluation with the bridge timeout.
    ///
    /// Must not be called from within an async context; that is exactly the
    /// scheduler nesting this type exists to avoid.
    pub fn evaluate(&self, agent: &AgentRuntime, context: &AgentContext) -> AgentResult {
        let outcome = self
            .runtime
            .block_on(async { tokio::time::timeout(BRIDGE_TIMEOUT, agent.evaluate(context)).await });
        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(layer = %context.layer, "bridged evaluation timed out");
                AgentResult::fallback("bridged evaluation timed out")
            }
        }
    }

    /// Run an arbitrary future on the bridge runtime under the same timeout.
    pub fn block_on_bounded<F, T>(&self, future: F) -> Option<T>
    where
        F: std::future::Future<Output = T>,
    {
        self.runtime
            .block_on(async { tokio::time::timeout(BRIDGE_TIMEOUT, future).await })
            .ok()
    }
}
