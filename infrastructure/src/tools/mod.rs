//! Tool executor adapters for the critic agent.

pub mod critic_toolbox;

pub use critic_toolbox::CriticToolbox;
