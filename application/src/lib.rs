//! Application layer for the Multi-Agent Orchestration Core
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{NullSnapshotStore, ProgressNotifier, SnapshotStore};
pub use use_cases::{
    CastVoteUseCase, OrchestrationRuntime, RunCrewUseCase, RunSwarmUseCase, SolveProblemUseCase,
};
