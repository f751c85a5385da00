//! Agent entity — identity, type, capabilities and mutable runtime state.

use crate::ids::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Closed enumeration of agent type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Programming,
    Devops,
    Testing,
    Documentation,
    Security,
    Design,
    Research,
    General,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Programming => "programming",
            AgentType::Devops => "devops",
            AgentType::Testing => "testing",
            AgentType::Documentation => "documentation",
            AgentType::Security => "security",
            AgentType::Design => "design",
            AgentType::Research => "research",
            AgentType::General => "general",
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "programming" => Ok(AgentType::Programming),
            "devops" => Ok(AgentType::Devops),
            "testing" => Ok(AgentType::Testing),
            "documentation" => Ok(AgentType::Documentation),
            "security" => Ok(AgentType::Security),
            "design" => Ok(AgentType::Design),
            "research" => Ok(AgentType::Research),
            "general" => Ok(AgentType::General),
            other => Err(format!("unknown agent type: {other}")),
        }
    }
}

/// Mutable runtime state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    #[default]
    Available,
    Busy,
    Failed,
}

/// Running performance counters for an agent, consumed by fitness functions
/// and problem-solver agent selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub avg_response_time_ms: f64,
}

impl AgentMetrics {
    pub fn success_rate(&self) -> f64 {
        let total = self.tasks_completed + self.tasks_failed;
        if total == 0 {
            1.0
        } else {
            self.tasks_completed as f64 / total as f64
        }
    }

    fn record(&mut self, success: bool, duration_ms: f64) {
        let total_before = self.tasks_completed + self.tasks_failed;
        if success {
            self.tasks_completed += 1;
        } else {
            self.tasks_failed += 1;
        }
        let total_after = total_before + 1;
        self.avg_response_time_ms = ((self.avg_response_time_ms * total_before as f64)
            + duration_ms)
            / total_after as f64;
    }
}

/// A registered agent: identity, type, capabilities, expertise and runtime state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub agent_type: AgentType,
    pub capabilities: HashSet<String>,
    /// Expertise weight in [0, 10], default 1.0.
    expertise_weight: f64,
    pub state: AgentState,
    pub metrics: AgentMetrics,
}

impl Agent {
    pub fn new(name: impl Into<String>, agent_type: AgentType) -> Self {
        Self {
            id: AgentId::generate(),
            name: name.into(),
            agent_type,
            capabilities: HashSet::new(),
            expertise_weight: 1.0,
            state: AgentState::Available,
            metrics: AgentMetrics::default(),
        }
    }

    pub fn with_id(mut self, id: AgentId) -> Self {
        self.id = id;
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(capabilities.into_iter().map(Into::into));
        self
    }

    pub fn with_expertise_weight(mut self, weight: f64) -> Self {
        self.expertise_weight = weight.clamp(0.0, 10.0);
        self
    }

    pub fn expertise_weight(&self) -> f64 {
        self.expertise_weight
    }

    /// Expertise weight is read-only after registration except via this call.
    pub fn update_expertise_weight(&mut self, weight: f64) {
        self.expertise_weight = weight.clamp(0.0, 10.0);
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, AgentState::Available)
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn record_execution(&mut self, success: bool, duration_ms: f64) {
        self.metrics.record(success, duration_ms);
    }

    /// The static descriptor external callers see, per the external interface contract.
    pub fn descriptor(&self) -> AgentDescriptor {
        AgentDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            agent_type: self.agent_type,
            capabilities: self.capabilities.iter().cloned().collect(),
            expertise_weight: self.expertise_weight,
        }
    }
}

/// Static, read-only description of an agent as exposed to external callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub name: String,
    pub agent_type: AgentType,
    pub capabilities: Vec<String>,
    pub expertise_weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_expertise_weight_is_one() {
        let agent = Agent::new("alice", AgentType::Programming);
        assert_eq!(agent.expertise_weight(), 1.0);
        assert!(agent.is_available());
    }

    #[test]
    fn expertise_weight_clamped() {
        let agent = Agent::new("bob", AgentType::Testing).with_expertise_weight(15.0);
        assert_eq!(agent.expertise_weight(), 10.0);
    }

    #[test]
    fn capability_lookup() {
        let agent = Agent::new("carol", AgentType::Security).with_capability("pentesting");
        assert!(agent.has_capability("pentesting"));
        assert!(!agent.has_capability("devops"));
    }

    #[test]
    fn metrics_success_rate() {
        let mut agent = Agent::new("dave", AgentType::General);
        assert_eq!(agent.metrics.success_rate(), 1.0);
        agent.record_execution(true, 10.0);
        agent.record_execution(false, 20.0);
        assert_eq!(agent.metrics.success_rate(), 0.5);
        assert_eq!(agent.metrics.avg_response_time_ms, 15.0);
    }

    #[test]
    fn agent_type_round_trips_through_str() {
        let t: AgentType = "devops".parse().unwrap();
        assert_eq!(t, AgentType::Devops);
        assert_eq!(t.to_string(), "devops");
        assert!("bogus".parse::<AgentType>().is_err());
    }
}
