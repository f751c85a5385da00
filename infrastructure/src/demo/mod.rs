//! A simulated [`AgentExecutor`] for running the CLI's `solve`/`crew` demos
//! without a real agent backend wired in — this is the stand-in a caller
//! replaces with their own executor.
//!
//! Quality is derived deterministically from the task title's hash so
//! repeated runs are reproducible rather than fabricated as a fixed
//! constant — the only liberty taken relative to a real executor is that
//! there is no actual work being scheduled.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use maoc_domain::agent::{AgentDescriptor, AgentType};
use maoc_domain::crew::Task;
use maoc_domain::error::OrchestrationError;
use maoc_domain::executor::{AgentExecutor, TaskContext, TaskOutcome};
use maoc_domain::ids::AgentId;
use serde_json::json;

/// Simulates executing a task: always succeeds, with a quality score
/// derived from the task's title and a configurable base quality.
pub struct SimulatedExecutor {
    descriptor: AgentDescriptor,
    base_quality: f64,
    latency: Duration,
}

impl SimulatedExecutor {
    pub fn new(name: impl Into<String>, agent_type: AgentType) -> Self {
        Self {
            descriptor: AgentDescriptor {
                id: AgentId::generate(),
                name: name.into(),
                agent_type,
                capabilities: Vec::new(),
                expertise_weight: 1.0,
            },
            base_quality: 0.75,
            latency: Duration::from_millis(0),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.descriptor.capabilities = capabilities;
        self
    }

    pub fn with_base_quality(mut self, base_quality: f64) -> Self {
        self.base_quality = base_quality.clamp(0.0, 1.0);
        self
    }

    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn quality_for(&self, task: &Task) -> f64 {
        let mut hasher = DefaultHasher::new();
        task.title.hash(&mut hasher);
        let jitter = (hasher.finish() % 21) as f64 / 100.0 - 0.10;
        (self.base_quality + jitter).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl AgentExecutor for SimulatedExecutor {
    async fn execute_task(
        &self,
        task: &Task,
        _context: &TaskContext,
    ) -> Result<TaskOutcome, OrchestrationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(TaskOutcome::success(
            json!({
                "agent": self.descriptor.name,
                "task": task.title,
            }),
            self.quality_for(task),
        ))
    }

    fn descriptor(&self) -> AgentDescriptor {
        self.descriptor.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn executes_successfully_with_a_clamped_quality_score() {
        let executor = SimulatedExecutor::new("demo-1", AgentType::General).with_base_quality(1.2);
        let task = Task::new("draft the plan", "write a short outline");
        let outcome = executor.execute_task(&task, &TaskContext::new()).await.unwrap();
        assert!(outcome.success);
        assert!(outcome.quality_score >= 0.0 && outcome.quality_score <= 1.0);
    }

    #[test]
    fn descriptor_reflects_construction_args() {
        let executor = SimulatedExecutor::new("demo-2", AgentType::Programming)
            .with_capabilities(vec!["rust".to_string()]);
        let descriptor = executor.descriptor();
        assert_eq!(descriptor.name, "demo-2");
        assert_eq!(descriptor.agent_type, AgentType::Programming);
        assert_eq!(descriptor.capabilities, vec!["rust".to_string()]);
    }
}
