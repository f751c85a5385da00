//! Infrastructure layer for the Multi-Agent Orchestration Core.
//!
//! Adapters implementing the ports the domain and application layers
//! declare as traits: an in-process [`MessageBus`](maoc_domain::bus::MessageBus),
//! a `figment`-backed configuration loader, `tracing` initialization, a
//! file-backed snapshot store, and a simulated agent executor for
//! demonstrating the engine without a real agent backend wired in.

pub mod bus;
pub mod config;
pub mod demo;
pub mod logging;
pub mod snapshot;

pub use bus::InProcessBus;
pub use config::{ConfigLoader, OrchestrationConfig};
pub use demo::SimulatedExecutor;
pub use logging::init_tracing;
pub use snapshot::FileSnapshotStore;
