//! Run lifecycle registry and the human-action wait primitive
//!
//! One slot per running task. The orchestrator parks on `wait_for_action`
//! after each queen decision; an operator thread unblocks it through
//! `submit_action`. Single-writer/single-reader: a second concurrent waiter
//! on the same task is rejected.

use atelier_domain::HumanAction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Lifecycle phase of a registered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Running,
    WaitingHuman,
    Completed,
    Failed,
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("task {0} is not registered")]
    UnknownTask(String),

    #[error("task {0} already has a waiter")]
    AlreadyWaiting(String),
}

#[derive(Default)]
struct Slot {
    phase: RunPhase,
    waiter: Option<oneshot::Sender<HumanAction>>,
}

impl Default for RunPhase {
    fn default() -> Self {
        RunPhase::Running
    }
}

/// Registry of in-flight runs.
#[derive(Default)]
pub struct RunRegistry {
    slots: Mutex<HashMap<String, Slot>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, task_id: &str) {
        self.slots
            .lock()
            .expect("run registry poisoned")
            .insert(task_id.to_string(), Slot::default());
    }

    pub fn set_phase(&self, task_id: &str, phase: RunPhase) {
        if let Some(slot) = self
            .slots
            .lock()
            .expect("run registry poisoned")
            .get_mut(task_id)
        {
            slot.phase = phase;
        }
    }

    pub fn phase(&self, task_id: &str) -> Option<RunPhase> {
        self.slots
            .lock()
            .expect("run registry poisoned")
            .get(task_id)
            .map(|s| s.phase)
    }

    pub fn remove(&self, task_id: &str) {
        self.slots
            .lock()
            .expect("run registry poisoned")
            .remove(task_id);
    }

    /// Park until a human action arrives or the timeout expires.
    ///
    /// `Ok(None)` is a timeout: the caller proceeds with its original
    /// decision. A concurrent second waiter on the same task is an error.
    pub async fn wait_for_action(
        &self,
        task_id: &str,
        timeout: Duration,
    ) -> Result<Option<HumanAction>, RegistryError> {
        let receiver = {
            let mut slots = self.slots.lock().expect("run registry poisoned");
            let slot = slots
                .get_mut(task_id)
                .ok_or_else(|| RegistryError::UnknownTask(task_id.to_string()))?;
            if slot.waiter.is_some() {
                return Err(RegistryError::AlreadyWaiting(task_id.to_string()));
            }
            let (tx, rx) = oneshot::channel();
            slot.waiter = Some(tx);
            slot.phase = RunPhase::WaitingHuman;
            rx
        };

        let outcome = tokio::time::timeout(timeout, receiver).await;

        let mut slots = self.slots.lock().expect("run registry poisoned");
        if let Some(slot) = slots.get_mut(task_id) {
            slot.waiter = None;
            slot.phase = RunPhase::Running;
        }

        match outcome {
            Ok(Ok(action)) => Ok(Some(action)),
            // Sender dropped without a send, or timeout: proceed unattended.
            Ok(Err(_)) | Err(_) => {
                debug!(task = task_id, "human wait ended without an action");
                Ok(None)
            }
        }
    }

    /// Deliver a human action to a parked run. Returns false when nobody is
    /// waiting (unknown task, run not paused, or already unblocked).
    pub fn submit_action(&self, task_id: &str, action: HumanAction) -> bool {
        let waiter = {
            let mut slots = self.slots.lock().expect("run registry poisoned");
            slots.get_mut(task_id).and_then(|slot| slot.waiter.take())
        };
        match waiter {
            Some(tx) => tx.send(action).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_submit_unblocks_waiter() {
        let registry = Arc::new(RunRegistry::new());
        registry.register("t1");

        let waiting = Arc::clone(&registry);
        let waiter = tokio::spawn(async move {
            waiting
                .wait_for_action("t1", Duration::from_secs(5))
                .await
                .unwrap()
        });

        // Let the waiter park first.
        tokio::task::yield_now().await;
        while registry.phase("t1") != Some(RunPhase::WaitingHuman) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(registry.submit_action("t1", HumanAction::Approve));
        let action = waiter.await.unwrap().unwrap();
        assert_eq!(action.as_str(), "approve");
        assert_eq!(registry.phase("t1"), Some(RunPhase::Running));
    }

    #[tokio::test]
    async fn test_timeout_returns_none() {
        let registry = RunRegistry::new();
        registry.register("t1");
        let outcome = registry
            .wait_for_action("t1", Duration::from_millis(20))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_submit_without_waiter_is_false() {
        let registry = RunRegistry::new();
        registry.register("t1");
        assert!(!registry.submit_action("t1", HumanAction::Approve));
        assert!(!registry.submit_action("unknown", HumanAction::Approve));
    }

    #[tokio::test]
    async fn test_second_waiter_rejected() {
        let registry = Arc::new(RunRegistry::new());
        registry.register("t1");

        let first = Arc::clone(&registry);
        let guard = tokio::spawn(async move {
            first.wait_for_action("t1", Duration::from_secs(2)).await
        });
        while registry.phase("t1") != Some(RunPhase::WaitingHuman) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let second = registry
            .wait_for_action("t1", Duration::from_millis(10))
            .await;
        assert!(matches!(second, Err(RegistryError::AlreadyWaiting(_))));

        registry.submit_action("t1", HumanAction::Approve);
        guard.await.unwrap().unwrap();
    }
}
