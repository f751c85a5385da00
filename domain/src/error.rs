//! Orchestration-wide error type.

use thiserror::Error;

/// Errors surfaced by the orchestration core.
///
/// Variant names name *kinds*, matching the error-kind catalogue the core is
/// specified against — not wrapper types for arbitrary downstream errors.
#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no suitable agent available")]
    NoSuitableAgent,

    #[error("member already present: {0}")]
    MemberAlreadyPresent(String),

    #[error("member not present: {0}")]
    MemberNotPresent(String),

    #[error("task dependency unsatisfied: {0}")]
    TaskDependencyUnsatisfied(String),

    #[error("circular dependency detected among tasks: {0:?}")]
    CircularDependency(Vec<String>),

    #[error("agent busy: {0}")]
    AgentBusy(String),

    #[error("voter ineligible: {0}")]
    VoterIneligible(String),

    #[error("duplicate vote from voter: {0}")]
    DuplicateVote(String),

    #[error("empty ballot")]
    EmptyBallot,

    #[error("quorum not met")]
    QuorumNotMet,

    #[error("unsupported voting strategy")]
    UnsupportedStrategy,

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("agent callback failed: {0}")]
    AgentCallbackFailed(String),

    #[error("convergence failed: swarm budget exhausted without improvement")]
    ConvergenceFailed,
}

impl OrchestrationError {
    /// Whether this error represents cancellation (as opposed to a hard failure).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrchestrationError::Cancelled)
    }

    /// Whether this error represents a deadline overrun.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, OrchestrationError::DeadlineExceeded)
    }

    /// `ConvergenceFailed` is informational, not fatal — callers may still use
    /// the best-so-far result it accompanies.
    pub fn is_informational(&self) -> bool {
        matches!(self, OrchestrationError::ConvergenceFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_recognized() {
        assert!(OrchestrationError::Cancelled.is_cancelled());
        assert!(!OrchestrationError::NoSuitableAgent.is_cancelled());
    }

    #[test]
    fn convergence_failed_is_informational() {
        assert!(OrchestrationError::ConvergenceFailed.is_informational());
        assert!(!OrchestrationError::DeadlineExceeded.is_informational());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            OrchestrationError::QuorumNotMet.to_string(),
            "quorum not met"
        );
    }
}
