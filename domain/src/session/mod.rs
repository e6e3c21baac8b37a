//! Conversation types shared by gateways and the agent runtime.

pub mod entities;
pub mod response;
