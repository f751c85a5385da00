//! Use cases — one module per externally-triggerable operation, each a thin
//! orchestration layer over the domain's pure/stateful building blocks.

pub mod cast_vote;
pub mod run_crew;
pub mod run_swarm;
pub mod shared;
pub mod solve_problem;

pub use cast_vote::{CastVoteError, CastVoteUseCase};
pub use run_crew::{RunCrewError, RunCrewUseCase};
pub use run_swarm::{RunSwarmError, RunSwarmUseCase, SwarmRunOutcome, SwarmWorkload};
pub use shared::OrchestrationRuntime;
pub use solve_problem::{SolveProblemError, SolveProblemInput, SolveProblemUseCase};
