//! The agent execution callback — the single external interface schedulers invoke.
//!
//! This is defined in the domain layer but implemented by callers (tests use
//! an in-memory stub; real deployments wire in whatever actually runs an
//! agent). The core never assumes anything about what happens inside it.

use crate::agent::AgentDescriptor;
use crate::crew::Task;
use crate::error::OrchestrationError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Context passed to an agent callback alongside the task it must execute.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    /// Opaque key/value context forwarded from the Problem or Crew.
    pub data: HashMap<String, String>,
}

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one `ExecuteTask` invocation.
///
/// `quality_score` must come from the callback — the core never fabricates it.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub success: bool,
    pub payload: Value,
    pub quality_score: f64,
}

impl TaskOutcome {
    pub fn success(payload: Value, quality_score: f64) -> Self {
        Self {
            success: true,
            payload,
            quality_score: quality_score.clamp(0.0, 1.0),
        }
    }

    pub fn failure(payload: Value) -> Self {
        Self {
            success: false,
            payload,
            quality_score: 0.0,
        }
    }
}

/// External callback an agent implementation exposes to the schedulers.
///
/// The error is the fixed `OrchestrationError::AgentCallbackFailed` kind
/// rather than an associated type — this keeps `dyn AgentExecutor`
/// object-safe so the Crew Scheduler and Agent Pool can hold a
/// heterogeneous registry of agents. `infrastructure::demo::SimulatedExecutor`
/// is the reference implementation.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Execute a task, returning within the task's own timeout budget.
    async fn execute_task(
        &self,
        task: &Task,
        context: &TaskContext,
    ) -> Result<TaskOutcome, OrchestrationError>;

    /// Static descriptor for the agent backing this callback.
    fn descriptor(&self) -> AgentDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_is_clamped() {
        let outcome = TaskOutcome::success(Value::Null, 1.5);
        assert_eq!(outcome.quality_score, 1.0);
        let outcome = TaskOutcome::success(Value::Null, -0.5);
        assert_eq!(outcome.quality_score, 0.0);
    }

    #[test]
    fn failure_outcome_has_zero_quality() {
        let outcome = TaskOutcome::failure(Value::String("boom".into()));
        assert!(!outcome.success);
        assert_eq!(outcome.quality_score, 0.0);
    }
}
