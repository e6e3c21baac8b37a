//! Evaluation layers, scores, layer states and cross-layer signals

pub mod board;
pub mod layer;
pub mod layer_state;
pub mod score;
pub mod signal;
