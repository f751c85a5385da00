//! Metrics & Event Log (§4.I) — an append-only ordered event store keyed by
//! component, bounded by a ring buffer, plus per-component counters. Every
//! update here goes through `&mut self`: callers enforce single-writer per
//! component discipline (§5); this module does not add its own locking.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

use crate::ids::{CrewId, SwarmId};

const DEFAULT_CAPACITY: usize = 10_000;

/// One entry in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub component: String,
    pub event_type: String,
    pub payload: Value,
}

/// Bounded, append-only, ordered event store.
pub struct EventLog {
    capacity: usize,
    next_sequence: u64,
    entries: VecDeque<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_sequence: 0,
            entries: VecDeque::new(),
        }
    }

    pub fn append(
        &mut self,
        component: impl Into<String>,
        event_type: impl Into<String>,
        payload: Value,
        timestamp_ms: u64,
    ) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push_back(Event {
            sequence,
            timestamp_ms,
            component: component.into(),
            event_type: event_type.into(),
            payload,
        });
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        sequence
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    pub fn by_component<'a>(&'a self, component: &'a str) -> impl Iterator<Item = &'a Event> {
        self.entries.iter().filter(move |e| e.component == component)
    }

    pub fn last_n(&self, n: usize) -> Vec<&Event> {
        let len = self.entries.len();
        self.entries.iter().skip(len.saturating_sub(n)).collect()
    }
}

/// Running counters for one registered algorithm (§4.G).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AlgorithmMetrics {
    pub executions: u64,
    pub successes: u64,
    pub failures: u64,
    total_duration_ms: f64,
}

impl AlgorithmMetrics {
    pub fn record(&mut self, success: bool, duration_ms: f64) {
        self.executions += 1;
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        self.total_duration_ms += duration_ms;
    }

    pub fn avg_duration_ms(&self) -> f64 {
        if self.executions == 0 {
            0.0
        } else {
            self.total_duration_ms / self.executions as f64
        }
    }
}

/// Running counters for one crew.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CrewMetrics {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub votes_conducted: u64,
    pub consensus_reached: u64,
    total_task_duration_ms: f64,
    completed_task_count: u64,
}

impl CrewMetrics {
    pub fn record_task(&mut self, success: bool, duration_ms: f64) {
        if success {
            self.tasks_completed += 1;
        } else {
            self.tasks_failed += 1;
        }
        self.total_task_duration_ms += duration_ms;
        self.completed_task_count += 1;
    }

    pub fn record_vote(&mut self, consensus: bool) {
        self.votes_conducted += 1;
        if consensus {
            self.consensus_reached += 1;
        }
    }

    pub fn avg_task_duration_ms(&self) -> f64 {
        if self.completed_task_count == 0 {
            0.0
        } else {
            self.total_task_duration_ms / self.completed_task_count as f64
        }
    }
}

/// Running counters for one swarm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwarmMetrics {
    pub iterations: u64,
    pub convergence_trace_last_10: Vec<f64>,
}

impl SwarmMetrics {
    pub fn record_iteration(&mut self, best_fitness: f64) {
        self.iterations += 1;
        self.convergence_trace_last_10.push(best_fitness);
        if self.convergence_trace_last_10.len() > 10 {
            self.convergence_trace_last_10.remove(0);
        }
    }
}

/// Running counters for the Problem Solver.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SolverMetrics {
    pub problems_solved: u64,
    total_confidence: f64,
    consensus_count: u64,
}

impl SolverMetrics {
    pub fn record(&mut self, confidence: f64, consensus_achieved: bool) {
        self.problems_solved += 1;
        self.total_confidence += confidence;
        if consensus_achieved {
            self.consensus_count += 1;
        }
    }

    pub fn average_confidence(&self) -> f64 {
        if self.problems_solved == 0 {
            0.0
        } else {
            self.total_confidence / self.problems_solved as f64
        }
    }

    pub fn consensus_rate(&self) -> f64 {
        if self.problems_solved == 0 {
            0.0
        } else {
            self.consensus_count as f64 / self.problems_solved as f64
        }
    }
}

/// Aggregate metrics registry: event log plus per-component counters.
#[derive(Default)]
pub struct MetricsRegistry {
    pub events: EventLog,
    algorithms: HashMap<String, AlgorithmMetrics>,
    crews: HashMap<CrewId, CrewMetrics>,
    swarms: HashMap<SwarmId, SwarmMetrics>,
    pub solver: SolverMetrics,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm(&mut self, name: &str) -> &mut AlgorithmMetrics {
        self.algorithms.entry(name.to_string()).or_default()
    }

    pub fn algorithm_snapshot(&self, name: &str) -> Option<AlgorithmMetrics> {
        self.algorithms.get(name).copied()
    }

    pub fn crew(&mut self, id: CrewId) -> &mut CrewMetrics {
        self.crews.entry(id).or_default()
    }

    pub fn crew_snapshot(&self, id: &CrewId) -> Option<CrewMetrics> {
        self.crews.get(id).copied()
    }

    pub fn swarm(&mut self, id: SwarmId) -> &mut SwarmMetrics {
        self.swarms.entry(id).or_default()
    }

    pub fn swarm_snapshot(&self, id: &SwarmId) -> Option<SwarmMetrics> {
        self.swarms.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_bounds_to_capacity() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.append("crew", "task_completed", serde_json::json!({"i": i}), i);
        }
        assert_eq!(log.len(), 3);
        let all: Vec<_> = log.all().collect();
        assert_eq!(all.first().unwrap().sequence, 2);
        assert_eq!(all.last().unwrap().sequence, 4);
    }

    #[test]
    fn filter_by_component() {
        let mut log = EventLog::new(10);
        log.append("crew-1", "ready", Value::Null, 0);
        log.append("swarm-1", "iteration", Value::Null, 1);
        log.append("crew-1", "task_completed", Value::Null, 2);

        let crew_events: Vec<_> = log.by_component("crew-1").collect();
        assert_eq!(crew_events.len(), 2);
    }

    #[test]
    fn algorithm_metrics_average_duration() {
        let mut metrics = AlgorithmMetrics::default();
        metrics.record(true, 10.0);
        metrics.record(false, 30.0);
        assert_eq!(metrics.executions, 2);
        assert_eq!(metrics.avg_duration_ms(), 20.0);
    }

    #[test]
    fn solver_metrics_rates() {
        let mut metrics = SolverMetrics::default();
        metrics.record(0.9, true);
        metrics.record(0.7, false);
        assert!((metrics.average_confidence() - 0.8).abs() < 1e-9);
        assert_eq!(metrics.consensus_rate(), 0.5);
    }

    #[test]
    fn swarm_metrics_trace_caps_at_ten() {
        let mut metrics = SwarmMetrics::default();
        for i in 0..15 {
            metrics.record_iteration(i as f64);
        }
        assert_eq!(metrics.convergence_trace_last_10.len(), 10);
        assert_eq!(metrics.convergence_trace_last_10[0], 5.0);
    }

    #[test]
    fn registry_creates_entries_lazily() {
        let mut registry = MetricsRegistry::new();
        registry.algorithm("merge_sort").record(true, 5.0);
        assert_eq!(registry.algorithm_snapshot("merge_sort").unwrap().executions, 1);
        assert!(registry.algorithm_snapshot("unknown").is_none());
    }
}
