//! Planning artifacts derived from critique rounds

pub mod evidence;
pub mod fixit;
pub mod plan_state;
