//! Infrastructure layer: concrete adapters
//!
//! Implements the application layer's ports: filesystem checkpoints and
//! archives, the offline studio collaborators, the scripted model gateway,
//! the two-role model router, the critic toolbox and the JSONL event log.

pub mod checkpoint;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod router;
pub mod studio;
pub mod tools;

pub use checkpoint::FsCheckpointStore;
pub use config::{ConfigLoader, FileConfig, ModelsConfig, StorageConfig};
pub use gateway::{submission_response, text_response, ScriptedGateway};
pub use logging::JsonlEventLog;
pub use router::LayerModelRouter;
pub use studio::{FsArchivist, StudioDraft, StudioScout};
pub use tools::CriticToolbox;
