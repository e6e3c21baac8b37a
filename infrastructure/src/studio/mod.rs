//! Offline studio adapters: deterministic scout, draft and archivist.

pub mod archivist;
pub mod draft;
pub mod scout;

pub use archivist::FsArchivist;
pub use draft::StudioDraft;
pub use scout::StudioScout;
