//! Filesystem checkpoint store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/index.json              cross-run index, one entry per task
//! <root>/<task_id>/<stage>.json  latest output of each stage
//! <root>/<task_id>/output.json   final run output
//! ```
//!
//! Documents are written to a temporary file and renamed into place so a
//! crash mid-write never leaves a truncated checkpoint behind.

use async_trait::async_trait;
use atelier_application::ports::{CheckpointError, CheckpointPort};
use atelier_domain::Stage;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FsCheckpointStore {
    root: PathBuf,
}

impl FsCheckpointStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn task_dir(&self, task_id: &str) -> PathBuf {
        // Task ids become directory names; keep them path-safe.
        let safe: String = task_id
            .chars()
            .map(|c| if c == '/' || c == '\\' || c == '.' { '_' } else { c })
            .collect();
        self.root.join(safe)
    }

    fn stage_path(&self, task_id: &str, stage: Stage) -> PathBuf {
        self.task_dir(task_id).join(format!("{}.json", stage.as_str()))
    }

    async fn write_atomic(
        &self,
        path: &Path,
        document: &serde_json::Value,
    ) -> Result<(), CheckpointError> {
        let parent = path
            .parent()
            .ok_or_else(|| CheckpointError::Io(format!("no parent for {}", path.display())))?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CheckpointError::Io(e.to_string()))?;

        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| CheckpointError::Io(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| CheckpointError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| CheckpointError::Io(e.to_string()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "checkpoint written");
        Ok(())
    }
}

#[async_trait]
impl CheckpointPort for FsCheckpointStore {
    async fn save_stage(
        &self,
        task_id: &str,
        stage: Stage,
        document: &serde_json::Value,
    ) -> Result<(), CheckpointError> {
        self.write_atomic(&self.stage_path(task_id, stage), document)
            .await
    }

    async fn load_stage(
        &self,
        task_id: &str,
        stage: Stage,
    ) -> Result<Option<serde_json::Value>, CheckpointError> {
        let path = self.stage_path(task_id, stage);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CheckpointError::Io(e.to_string())),
        };
        let value = serde_json::from_slice(&bytes).map_err(|e| CheckpointError::Corrupt {
            stage,
            message: e.to_string(),
        })?;
        Ok(Some(value))
    }

    async fn save_output(
        &self,
        task_id: &str,
        document: &serde_json::Value,
    ) -> Result<(), CheckpointError> {
        self.write_atomic(&self.task_dir(task_id).join("output.json"), document)
            .await
    }

    async fn update_index(
        &self,
        task_id: &str,
        entry: &serde_json::Value,
    ) -> Result<(), CheckpointError> {
        let path = self.root.join("index.json");
        let mut index: serde_json::Map<String, serde_json::Value> =
            match tokio::fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Default::default(),
                Err(e) => return Err(CheckpointError::Io(e.to_string())),
            };
        index.insert(task_id.to_string(), entry.clone());
        self.write_atomic(&path, &serde_json::Value::Object(index))
            .await
    }
}
