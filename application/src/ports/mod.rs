//! Port definitions (interfaces for external adapters).
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! The domain layer's own `AgentExecutor` and `MessageBus` traits are ports
//! too; they live there because schedulers are domain logic. This module
//! holds the ports that are specific to driving use cases.

pub mod progress;
pub mod snapshot_store;

pub use progress::{NoProgress, ProgressNotifier};
pub use snapshot_store::{NullSnapshotStore, OrchestrationSnapshot, SnapshotError, SnapshotStore};
