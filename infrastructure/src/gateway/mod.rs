//! Model gateway adapters.

pub mod scripted;

pub use scripted::{submission_response, text_response, ScriptedGateway};
