//! Shared per-run analysis board
//!
//! Completed layer analyses are published here so that later escalations
//! (progressive mode) and the `read_layer_analysis` tool can read them.

use super::layer::Layer;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Cheaply cloneable handle to the per-run analysis board.
///
/// Read-mostly: the critic writes once per completed layer, agent tool calls
/// read concurrently.
#[derive(Debug, Clone, Default)]
pub struct AnalysisBoard {
    inner: Arc<RwLock<BTreeMap<Layer, String>>>,
}

impl AnalysisBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or extend) the analysis text for a layer.
    pub fn record(&self, layer: Layer, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        let mut map = self.inner.write().expect("analysis board poisoned");
        map.entry(layer)
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(&text);
            })
            .or_insert(text);
    }

    pub fn get(&self, layer: Layer) -> Option<String> {
        self.inner
            .read()
            .expect("analysis board poisoned")
            .get(&layer)
            .cloned()
    }

    /// Analyses for all layers strictly before `layer`, in evaluation order.
    ///
    /// This is the cumulative context handed to progressive-mode escalations.
    pub fn completed_before(&self, layer: Layer) -> Vec<(Layer, String)> {
        let map = self.inner.read().expect("analysis board poisoned");
        Layer::ALL
            .iter()
            .take_while(|l| **l != layer)
            .filter_map(|l| map.get(l).map(|t| (*l, t.clone())))
            .collect()
    }

    pub fn snapshot(&self) -> BTreeMap<Layer, String> {
        self.inner.read().expect("analysis board poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_read() {
        let board = AnalysisBoard::new();
        board.record(Layer::VisualForm, "crisp linework");
        board.record(Layer::VisualForm, "muted palette");
        assert_eq!(
            board.get(Layer::VisualForm).unwrap(),
            "crisp linework\nmuted palette"
        );
    }

    #[test]
    fn test_completed_before_is_ordered_prefix() {
        let board = AnalysisBoard::new();
        board.record(Layer::Composition, "strong diagonal");
        board.record(Layer::VisualForm, "crisp linework");
        board.record(Layer::SymbolicMeaning, "crane as longevity");

        let before = board.completed_before(Layer::CulturalContext);
        assert_eq!(before.len(), 2);
        assert_eq!(before[0].0, Layer::VisualForm);
        assert_eq!(before[1].0, Layer::Composition);
    }

    #[test]
    fn test_clone_shares_state() {
        let board = AnalysisBoard::new();
        let clone = board.clone();
        clone.record(Layer::PhilosophicalDepth, "wabi-sabi reading");
        assert!(board.get(Layer::PhilosophicalDepth).is_some());
    }
}
