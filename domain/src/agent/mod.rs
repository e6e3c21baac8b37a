//! Agent evaluation context and result types

pub mod context;
pub mod result;
