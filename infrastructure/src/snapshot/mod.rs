//! File-backed [`SnapshotStore`] — persists an [`OrchestrationSnapshot`] as
//! one JSON file per key under `root_dir`, creating parent directories on
//! demand and logging backend failures instead of panicking.

use std::path::PathBuf;

use async_trait::async_trait;
use maoc_application::ports::snapshot_store::{OrchestrationSnapshot, SnapshotError, SnapshotStore};
use tokio::fs;
use tracing::warn;

/// Stores one JSON file per snapshot key under `root_dir`.
pub struct FileSnapshotStore {
    root_dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root_dir.join(format!("{key}.snapshot.json"))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, key: &str, snapshot: &OrchestrationSnapshot) -> Result<(), SnapshotError> {
        if let Err(e) = fs::create_dir_all(&self.root_dir).await {
            warn!(dir = %self.root_dir.display(), error = %e, "could not create snapshot directory");
            return Err(SnapshotError::Backend(e.to_string()));
        }

        let body = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        fs::write(self.path_for(key), body)
            .await
            .map_err(|e| SnapshotError::Backend(e.to_string()))
    }

    async fn load(&self, key: &str) -> Result<OrchestrationSnapshot, SnapshotError> {
        let path = self.path_for(key);
        let body = fs::read(&path)
            .await
            .map_err(|_| SnapshotError::NotFound(key.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_snapshot_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        let snapshot = OrchestrationSnapshot {
            taken_at_ms: 42,
            payload: serde_json::json!({"problems": []}),
        };
        store.save("session-1", &snapshot).await.unwrap();

        let loaded = store.load("session-1").await.unwrap();
        assert_eq!(loaded.taken_at_ms, 42);
        assert_eq!(loaded.payload, serde_json::json!({"problems": []}));
    }

    #[tokio::test]
    async fn missing_key_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        let result = store.load("absent").await;
        assert!(matches!(result, Err(SnapshotError::NotFound(_))));
    }
}
