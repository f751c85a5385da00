//! Snapshot persistence port (§6 "Persistence hook (optional)").
//!
//! The core is in-memory; this port is the only seam through which static
//! orchestration state (problems, solutions, crew/swarm rosters) can be
//! captured and restored. Active work is never resumed — only static state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("storage backend failed: {0}")]
    Backend(String),

    #[error("no snapshot found for key: {0}")]
    NotFound(String),
}

/// Static, serializable view of orchestration state captured at a point in
/// time. Infrastructure adapters persist and retrieve this opaque blob; the
/// application layer is responsible for populating/consuming its fields.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrchestrationSnapshot {
    pub taken_at_ms: u64,
    pub payload: serde_json::Value,
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, key: &str, snapshot: &OrchestrationSnapshot) -> Result<(), SnapshotError>;
    async fn load(&self, key: &str) -> Result<OrchestrationSnapshot, SnapshotError>;
}

/// Default no-op store: `save` succeeds silently, `load` always reports
/// `NotFound`. The right default when snapshotting isn't wired up.
pub struct NullSnapshotStore;

#[async_trait]
impl SnapshotStore for NullSnapshotStore {
    async fn save(&self, _key: &str, _snapshot: &OrchestrationSnapshot) -> Result<(), SnapshotError> {
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<OrchestrationSnapshot, SnapshotError> {
        Err(SnapshotError::NotFound(key.to_string()))
    }
}
