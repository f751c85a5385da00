//! Agent Pool — shared registry of agent capabilities and availability bookkeeping.
//!
//! The Pool is the single source of truth for the `busy` flag: schedulers
//! reserve an agent before invoking it and release after (including on error
//! paths). Plain, synchronous data structure — callers that need to share one
//! pool across concurrent tasks wrap it in their own mutex.

use crate::agent::{Agent, AgentState, AgentType};
use crate::error::OrchestrationError;
use crate::ids::{AgentId, ReservationId};
use std::collections::HashMap;

/// An exclusive-use token issued for the lifetime of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub agent_id: AgentId,
    pub holder_id: String,
}

#[derive(Default)]
pub struct AgentPool {
    agents: HashMap<AgentId, Agent>,
    reservations: HashMap<ReservationId, Reservation>,
}

impl AgentPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, agent: Agent) -> AgentId {
        let id = agent.id.clone();
        self.agents.insert(id.clone(), agent);
        id
    }

    pub fn lookup(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn lookup_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Agents of the given type, in registration-stable order, capped at `limit`.
    pub fn match_by_type(&self, agent_type: AgentType, limit: usize) -> Vec<&Agent> {
        let mut matches: Vec<&Agent> = self
            .agents
            .values()
            .filter(|a| a.agent_type == agent_type)
            .collect();
        matches.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        matches.truncate(limit);
        matches
    }

    /// Agents exposing the given capability string, capped at `limit`.
    pub fn match_by_capability(&self, capability: &str, limit: usize) -> Vec<&Agent> {
        let mut matches: Vec<&Agent> = self
            .agents
            .values()
            .filter(|a| a.has_capability(capability))
            .collect();
        matches.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        matches.truncate(limit);
        matches
    }

    /// Reserve an agent for exclusive use by `holder_id`.
    ///
    /// Fails with `AgentBusy` if the agent is already reserved or marked busy;
    /// this is the caller-policy-independent default — concurrent reservation
    /// attempts never block, they fail fast.
    pub fn reserve(
        &mut self,
        agent_id: &AgentId,
        holder_id: impl Into<String>,
    ) -> Result<Reservation, OrchestrationError> {
        let agent = self
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| OrchestrationError::MemberNotPresent(agent_id.to_string()))?;

        if !agent.is_available() {
            return Err(OrchestrationError::AgentBusy(agent_id.to_string()));
        }

        agent.state = AgentState::Busy;
        let reservation = Reservation {
            id: ReservationId::generate(),
            agent_id: agent_id.clone(),
            holder_id: holder_id.into(),
        };
        self.reservations
            .insert(reservation.id.clone(), reservation.clone());
        Ok(reservation)
    }

    /// Release a reservation, restoring the agent to `Available` unless it
    /// was separately marked `Failed`.
    pub fn release(&mut self, reservation: &Reservation) {
        if self.reservations.remove(&reservation.id).is_none() {
            return;
        }
        if let Some(agent) = self.agents.get_mut(&reservation.agent_id)
            && agent.state == AgentState::Busy
        {
            agent.state = AgentState::Available;
        }
    }

    /// Mark an agent as permanently failed (e.g. after exhausting retries).
    pub fn mark_failed(&mut self, agent_id: &AgentId) {
        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.state = AgentState::Failed;
        }
    }

    pub fn update_expertise_weight(&mut self, agent_id: &AgentId, weight: f64) {
        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.update_expertise_weight(weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentType;

    fn pool_with_one_agent() -> (AgentPool, AgentId) {
        let mut pool = AgentPool::new();
        let id = pool.register(Agent::new("alice", AgentType::Programming));
        (pool, id)
    }

    #[test]
    fn register_and_lookup() {
        let (pool, id) = pool_with_one_agent();
        assert!(pool.lookup(&id).is_some());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn reserve_then_release_roundtrip() {
        let (mut pool, id) = pool_with_one_agent();
        let reservation = pool.reserve(&id, "crew-1").unwrap();
        assert!(!pool.lookup(&id).unwrap().is_available());

        pool.release(&reservation);
        assert!(pool.lookup(&id).unwrap().is_available());
    }

    #[test]
    fn second_reservation_fails_while_held() {
        let (mut pool, id) = pool_with_one_agent();
        let _first = pool.reserve(&id, "holder-a").unwrap();

        let second = pool.reserve(&id, "holder-b");
        assert!(matches!(second, Err(OrchestrationError::AgentBusy(_))));
    }

    #[test]
    fn match_by_type_respects_limit() {
        let mut pool = AgentPool::new();
        for i in 0..5 {
            pool.register(Agent::new(format!("agent-{i}"), AgentType::Testing));
        }
        let matches = pool.match_by_type(AgentType::Testing, 3);
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn match_by_capability() {
        let mut pool = AgentPool::new();
        pool.register(Agent::new("a", AgentType::Security).with_capability("pentest"));
        pool.register(Agent::new("b", AgentType::Security));

        let matches = pool.match_by_capability("pentest", 10);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "a");
    }

    #[test]
    fn reserve_unknown_agent_errors() {
        let mut pool = AgentPool::new();
        let bogus = AgentId::generate();
        assert!(pool.reserve(&bogus, "holder").is_err());
    }
}
