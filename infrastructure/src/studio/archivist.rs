//! Filesystem archivist
//!
//! Accepted and downgraded runs land as one pretty-printed JSON record per
//! task under the archive directory.

use async_trait::async_trait;
use atelier_application::ports::{ArchiveError, ArchiveRecord, ArchivistPort};
use std::path::PathBuf;
use tracing::info;

pub struct FsArchivist {
    dir: PathBuf,
}

impl FsArchivist {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArchivistPort for FsArchivist {
    async fn archive(&self, record: &ArchiveRecord) -> Result<String, ArchiveError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ArchiveError::ArchiveFailed(e.to_string()))?;
        let path = self.dir.join(format!("{}.json", record.task_id));
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| ArchiveError::ArchiveFailed(e.to_string()))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ArchiveError::ArchiveFailed(e.to_string()))?;
        info!(task = %record.task_id, path = %path.display(), "run archived");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_domain::{QueenAction, QueenDecision};

    #[tokio::test]
    async fn test_archive_writes_record() {
        let dir = tempfile::tempdir().unwrap();
        let archivist = FsArchivist::new(dir.path().join("archive"));

        let record = ArchiveRecord {
            task_id: "task-7".to_string(),
            decision: QueenDecision {
                action: QueenAction::Accept,
                reason: "gate passed".to_string(),
                rerun_dimensions: Vec::new(),
                candidate_id: Some("cand-1".to_string()),
            },
            best_candidate: None,
            best_score: None,
            total_rounds: 2,
            total_cost_usd: 0.42,
            archived_at: chrono::Utc::now(),
        };

        let location = archivist.archive(&record).await.unwrap();
        let bytes = tokio::fs::read(&location).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["task_id"], "task-7");
        assert_eq!(parsed["decision"]["action"], "accept");
        assert_eq!(parsed["total_rounds"], 2);
    }
}
