//! Logging adapters.

pub mod event_log;

pub use event_log::JsonlEventLog;
