//! Agent tool vocabulary.

pub mod entities;
