//! Model routing and the LLM cost ledger.

pub mod layer_router;

pub use layer_router::LayerModelRouter;
