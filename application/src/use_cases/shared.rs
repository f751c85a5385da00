//! Shared runtime state across use cases.
//!
//! Wraps the domain layer's plain data structures (`AgentPool`,
//! `MetricsRegistry`) in async mutexes so multiple use cases can drive the
//! same pool of registered agents concurrently, and holds the registry of
//! `AgentExecutor` callbacks keyed by agent id.

use std::collections::HashMap;
use std::sync::Arc;

use maoc_domain::agent::{Agent, AgentType};
use maoc_domain::error::OrchestrationError;
use maoc_domain::executor::AgentExecutor;
use maoc_domain::ids::AgentId;
use maoc_domain::metrics::MetricsRegistry;
use maoc_domain::pool::AgentPool;
use tokio::sync::Mutex;

/// Shared, mutex-guarded orchestration state a session's use cases operate
/// against. Cheaply cloneable — every clone shares the same underlying pool,
/// executor registry and metrics.
#[derive(Clone)]
pub struct OrchestrationRuntime {
    pool: Arc<Mutex<AgentPool>>,
    executors: Arc<Mutex<HashMap<AgentId, Arc<dyn AgentExecutor>>>>,
    metrics: Arc<Mutex<MetricsRegistry>>,
}

impl Default for OrchestrationRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestrationRuntime {
    pub fn new() -> Self {
        Self {
            pool: Arc::new(Mutex::new(AgentPool::new())),
            executors: Arc::new(Mutex::new(HashMap::new())),
            metrics: Arc::new(Mutex::new(MetricsRegistry::new())),
        }
    }

    /// Register an agent and its executor callback together — the pool entry
    /// and the callback registry must never drift apart.
    pub async fn register_agent(
        &self,
        name: impl Into<String>,
        agent_type: AgentType,
        executor: Arc<dyn AgentExecutor>,
    ) -> AgentId {
        let agent = Agent::new(name, agent_type);
        let id = agent.id.clone();
        self.pool.lock().await.register(agent);
        self.executors.lock().await.insert(id.clone(), executor);
        id
    }

    pub fn pool(&self) -> &Mutex<AgentPool> {
        &self.pool
    }

    pub fn metrics(&self) -> &Mutex<MetricsRegistry> {
        &self.metrics
    }

    pub async fn executors_snapshot(&self) -> HashMap<AgentId, Arc<dyn AgentExecutor>> {
        self.executors.lock().await.clone()
    }

    pub async fn agent_count(&self) -> usize {
        self.pool.lock().await.len()
    }

    pub async fn mark_agent_failed(&self, agent_id: &AgentId) -> Result<(), OrchestrationError> {
        let mut pool = self.pool.lock().await;
        if pool.lookup(agent_id).is_none() {
            return Err(OrchestrationError::MemberNotPresent(agent_id.to_string()));
        }
        pool.mark_failed(agent_id);
        Ok(())
    }
}

/// Current wall-clock in milliseconds, the only place use cases are allowed
/// to read it — domain code never calls `chrono::Utc::now()` itself so its
/// logic stays deterministic under test.
pub(crate) fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
