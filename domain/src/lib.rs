//! Domain layer for the Multi-Agent Orchestration Core.
//!
//! This crate contains the core business logic, entities and algorithms. It
//! has no dependency on infrastructure or presentation concerns — the only
//! "I/O" seam it exposes is the [`executor::AgentExecutor`] callback trait,
//! which callers implement however they run an agent.

pub mod agent;
pub mod algorithm;
pub mod bus;
pub mod cancellation;
pub mod consensus;
pub mod crew;
pub mod error;
pub mod executor;
pub mod ids;
pub mod metrics;
pub mod pool;
pub mod problem;
pub mod swarm;
pub mod vote;

pub use agent::{Agent, AgentDescriptor, AgentState, AgentType};
pub use algorithm::{AlgorithmDescriptor, AlgorithmFamily, AlgorithmOrchestrator, Recommendation, TaskDescriptor};
pub use bus::{Message, MessageBus, MessageType};
pub use cancellation::CancellationFlag;
pub use consensus::{ConsensusBuilder, ConsensusConfig, ConsensusOutcome, Proposal, ProposalStatus};
pub use crew::{Crew, CrewConfig, CrewMember, CrewScheduler, CrewState, ProcessMode, Role, Task, TaskStatus};
pub use error::OrchestrationError;
pub use executor::{AgentExecutor, TaskContext, TaskOutcome};
pub use ids::{
    AgentId, CrewId, ProblemId, ProposalId, ReservationId, SubProblemId, SwarmId, TaskId, VotingSessionId,
};
pub use metrics::{AlgorithmMetrics, CrewMetrics, Event, EventLog, MetricsRegistry, SolverMetrics, SwarmMetrics};
pub use pool::{AgentPool, Reservation};
pub use problem::{Approach, Complexity, Problem, ProblemSolver, ProblemType, Solution, SolverConfig, SubProblem};
pub use swarm::{Swarm, SwarmBehavior, SwarmConfig};
pub use vote::{Vote, VoteResult, VotingSession, VotingStrategy, VoterConfig};
