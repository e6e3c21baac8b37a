//! Ports (interfaces) the application layer depends on.
//!
//! Adapters implementing these live in the infrastructure layer.

pub mod archivist;
pub mod checkpoint;
pub mod draft;
pub mod model_gateway;
pub mod model_router;
pub mod scout;
pub mod tool_executor;

pub use archivist::{ArchiveError, ArchiveRecord, ArchivistPort};
pub use checkpoint::{CheckpointError, CheckpointPort};
pub use draft::{DraftError, DraftPort, DraftRequest, RefineRequest};
pub use model_gateway::{GatewayError, ModelGatewayPort, ModelRequest, ToolChoice};
pub use model_router::ModelRouterPort;
pub use scout::{ScoutError, ScoutPort};
pub use tool_executor::{ToolExecutorError, ToolExecutorPort};
