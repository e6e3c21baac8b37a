//! Pipeline run vocabulary: stages, candidates, decisions, events.

pub mod candidate;
pub mod event;
pub mod human;
pub mod input;
pub mod queen;
pub mod stage;
pub mod tradition;
