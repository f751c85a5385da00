//! Swarm Coordinator (§4.D) — population-based optimization (PSO, ACO, ABC)
//! plus the democratic swarm task mode, and the [`Swarm`] entity that tracks
//! a roster, iteration history and convergence trace.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::agent::AgentType;
use crate::cancellation::CancellationFlag;
use crate::ids::{AgentId, SwarmId};
use crate::vote::{Vote, VoterConfig, VotingStrategy, aggregate};

/// Behavior a [`Swarm`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmBehavior {
    Pso,
    Aco,
    Abc,
    Democratic,
}

/// Configuration for a swarm, per the external configuration surface (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwarmConfig {
    pub name: String,
    pub behavior: SwarmBehavior,
    pub min_agents: usize,
    pub max_agents: usize,
    pub voting_strategy: VotingStrategy,
    pub required_agent_types: Vec<AgentType>,
}

impl SwarmConfig {
    pub fn new(name: impl Into<String>, behavior: SwarmBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            min_agents: 1,
            max_agents: 10,
            voting_strategy: VotingStrategy::Majority,
            required_agent_types: Vec::new(),
        }
    }
}

/// One convergence observation: iteration index and best fitness seen so far.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub iteration: usize,
    pub best_fitness: f64,
}

/// A swarm: configuration, shared-borrow agent roster, and history. A swarm
/// owns no agents — membership is a non-owning reference mediated by the
/// Agent Pool (§5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swarm {
    pub id: SwarmId,
    pub config: SwarmConfig,
    pub roster: Vec<AgentId>,
    pub iteration_history: Vec<ConvergencePoint>,
}

impl Swarm {
    pub fn new(config: SwarmConfig) -> Self {
        Self {
            id: SwarmId::generate(),
            config,
            roster: Vec::new(),
            iteration_history: Vec::new(),
        }
    }

    pub fn add_agent(&mut self, agent_id: AgentId) {
        if !self.roster.contains(&agent_id) {
            self.roster.push(agent_id);
        }
    }

    /// Last 10 convergence points, per the Metrics & Event Log bound (§4.I).
    pub fn convergence_trace(&self) -> &[ConvergencePoint] {
        let len = self.iteration_history.len();
        &self.iteration_history[len.saturating_sub(10)..]
    }
}

/// Result of a population-based optimization run, common to PSO/ACO/ABC.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub best_position: Vec<f64>,
    pub best_fitness: f64,
    pub convergence_trace: Vec<f64>,
    pub iterations_run: usize,
    pub cancelled: bool,
}

/// Result of an ACO path search.
#[derive(Debug, Clone)]
pub struct PathResult {
    pub best_path: Option<Vec<String>>,
    pub best_length: Option<usize>,
    pub convergence_trace: Vec<f64>,
    pub iterations_run: usize,
    pub cancelled: bool,
}

/// Tuning constants for [`run_pso`].
#[derive(Debug, Clone, Copy)]
pub struct PsoParams {
    pub inertia: f64,
    pub cognitive: f64,
    pub social: f64,
    pub iterations: usize,
}

impl Default for PsoParams {
    fn default() -> Self {
        Self {
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            iterations: 50,
        }
    }
}

#[derive(Debug, Clone)]
struct Particle {
    position: Vec<f64>,
    velocity: Vec<f64>,
    best_position: Vec<f64>,
    best_fitness: f64,
    fitness: f64,
}

/// Particle Swarm Optimization over a continuous vector space bounded per
/// dimension by `bounds`. `fitness` is higher-is-better. Ties in best-update
/// favor the incumbent (strict improvement required to replace).
pub fn run_pso(
    num_particles: usize,
    bounds: &[(f64, f64)],
    fitness: impl Fn(&[f64]) -> f64,
    params: PsoParams,
    cancellation: &CancellationFlag,
) -> OptimizationResult {
    let dims = bounds.len();
    let mut rng = rand::thread_rng();

    let mut particles: Vec<Particle> = (0..num_particles.max(1))
        .map(|_| {
            let position: Vec<f64> = bounds.iter().map(|(lo, hi)| rng.gen_range(*lo..=*hi)).collect();
            let velocity = vec![0.0; dims];
            let f = fitness(&position);
            Particle {
                position: position.clone(),
                velocity,
                best_position: position,
                best_fitness: f,
                fitness: f,
            }
        })
        .collect();

    let mut global_best_position = particles
        .iter()
        .max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
        .map(|p| p.best_position.clone())
        .unwrap_or_default();
    let mut global_best_fitness = particles
        .iter()
        .map(|p| p.best_fitness)
        .fold(f64::MIN, f64::max);

    let mut convergence_trace = Vec::with_capacity(params.iterations);
    let mut iterations_run = 0;
    let mut cancelled = false;

    for _ in 0..params.iterations {
        if cancellation.is_cancelled() {
            cancelled = true;
            break;
        }
        iterations_run += 1;

        for particle in &mut particles {
            particle.fitness = fitness(&particle.position);
            if particle.fitness > particle.best_fitness {
                particle.best_fitness = particle.fitness;
                particle.best_position = particle.position.clone();
            }
            if particle.best_fitness > global_best_fitness {
                global_best_fitness = particle.best_fitness;
                global_best_position = particle.best_position.clone();
            }
        }

        for particle in &mut particles {
            for i in 0..dims {
                let r1: f64 = rng.gen_range(0.0..=1.0);
                let r2: f64 = rng.gen_range(0.0..=1.0);
                let cognitive = params.cognitive * r1 * (particle.best_position[i] - particle.position[i]);
                let social = params.social * r2 * (global_best_position[i] - particle.position[i]);
                particle.velocity[i] = params.inertia * particle.velocity[i] + cognitive + social;
                particle.position[i] += particle.velocity[i];
            }
        }

        convergence_trace.push(global_best_fitness);
    }

    OptimizationResult {
        best_position: global_best_position,
        best_fitness: global_best_fitness,
        convergence_trace: tail(&convergence_trace, 10),
        iterations_run,
        cancelled,
    }
}

/// Tuning constants for [`run_aco`].
#[derive(Debug, Clone, Copy)]
pub struct AcoParams {
    pub num_ants: usize,
    pub iterations: usize,
    pub alpha: f64,
    pub beta: f64,
    pub evaporation_rate: f64,
    pub delta_t: f64,
}

impl Default for AcoParams {
    fn default() -> Self {
        Self {
            num_ants: 10,
            iterations: 30,
            alpha: 1.0,
            beta: 2.0,
            evaporation_rate: 0.1,
            delta_t: 1.0,
        }
    }
}

const PHEROMONE_FLOOR: f64 = 0.01;

/// Ant Colony Optimization over a directed graph. `heuristic` defaults to
/// 1.0 for every edge when `None`. Path length is hard-bounded at `2 *
/// nodes.len()` to prevent cycles.
pub fn run_aco(
    graph: &HashMap<String, Vec<String>>,
    source: &str,
    goal: &str,
    heuristic: Option<&dyn Fn(&str, &str) -> f64>,
    params: AcoParams,
    cancellation: &CancellationFlag,
) -> PathResult {
    let mut pheromone: HashMap<(String, String), f64> = HashMap::new();
    for (from, neighbors) in graph {
        for to in neighbors {
            pheromone.insert((from.clone(), to.clone()), 1.0);
        }
    }

    let node_count = graph.len().max(1);
    let max_path_len = 2 * node_count;
    let mut rng = rand::thread_rng();

    let mut best_path: Option<Vec<String>> = None;
    let mut best_length: Option<usize> = None;
    let mut convergence_trace = Vec::with_capacity(params.iterations);
    let mut iterations_run = 0;
    let mut cancelled = false;

    for _ in 0..params.iterations {
        if cancellation.is_cancelled() {
            cancelled = true;
            break;
        }
        iterations_run += 1;

        let mut successful_paths: Vec<Vec<String>> = Vec::new();

        for _ in 0..params.num_ants {
            if let Some(path) = build_ant_path(
                graph, &pheromone, source, goal, heuristic, params.alpha, params.beta,
                max_path_len, &mut rng,
            ) {
                if best_length.is_none_or(|len| path.len() - 1 < len) {
                    best_length = Some(path.len() - 1);
                    best_path = Some(path.clone());
                }
                successful_paths.push(path);
            }
        }

        for value in pheromone.values_mut() {
            *value = (*value * (1.0 - params.evaporation_rate * params.delta_t)).max(PHEROMONE_FLOOR);
        }
        for path in &successful_paths {
            let length = (path.len() - 1).max(1);
            let deposit = 1.0 / length as f64;
            for edge in path.windows(2) {
                let key = (edge[0].clone(), edge[1].clone());
                *pheromone.entry(key).or_insert(PHEROMONE_FLOOR) += deposit;
            }
        }

        convergence_trace.push(best_length.map(|l| l as f64).unwrap_or(f64::INFINITY));
    }

    PathResult {
        best_path,
        best_length,
        convergence_trace: tail(&convergence_trace, 10),
        iterations_run,
        cancelled,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_ant_path(
    graph: &HashMap<String, Vec<String>>,
    pheromone: &HashMap<(String, String), f64>,
    source: &str,
    goal: &str,
    heuristic: Option<&dyn Fn(&str, &str) -> f64>,
    alpha: f64,
    beta: f64,
    max_len: usize,
    rng: &mut impl Rng,
) -> Option<Vec<String>> {
    let mut path = vec![source.to_string()];
    let mut visited: std::collections::HashSet<String> = [source.to_string()].into_iter().collect();
    let mut current = source.to_string();

    while current != goal && path.len() < max_len {
        let neighbors: Vec<&String> = graph
            .get(&current)?
            .iter()
            .filter(|n| !visited.contains(*n))
            .collect();
        if neighbors.is_empty() {
            return None;
        }

        let weights: Vec<f64> = neighbors
            .iter()
            .map(|n| {
                let tau = pheromone
                    .get(&(current.clone(), (*n).clone()))
                    .copied()
                    .unwrap_or(1.0);
                let eta = heuristic.map(|h| h(&current, n)).unwrap_or(1.0).max(0.0);
                tau.powf(alpha) * eta.powf(beta)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let chosen = if total <= 0.0 {
            neighbors[rng.gen_range(0..neighbors.len())].clone()
        } else {
            let mut pick = rng.gen_range(0.0..total);
            let mut chosen = neighbors.last().unwrap().to_string();
            for (neighbor, weight) in neighbors.iter().zip(weights.iter()) {
                if pick < *weight {
                    chosen = (*neighbor).clone();
                    break;
                }
                pick -= weight;
            }
            chosen
        };

        path.push(chosen.clone());
        visited.insert(chosen.clone());
        current = chosen;
    }

    if current == goal { Some(path) } else { None }
}

/// Tuning constants for [`run_abc`].
#[derive(Debug, Clone, Copy)]
pub struct AbcParams {
    pub num_sources: usize,
    pub iterations: usize,
    pub abandonment_limit: usize,
}

impl Default for AbcParams {
    fn default() -> Self {
        Self {
            num_sources: 10,
            iterations: 50,
            abandonment_limit: 10,
        }
    }
}

#[derive(Debug, Clone)]
struct FoodSource {
    position: Vec<f64>,
    fitness: f64,
    visit_count: usize,
}

/// Artificial Bee Colony over a continuous vector space bounded per
/// dimension by `bounds`. Employed bees perturb greedily, onlooker bees
/// select proportional to fitness, scout bees reset abandoned sources.
pub fn run_abc(
    bounds: &[(f64, f64)],
    fitness: impl Fn(&[f64]) -> f64,
    params: AbcParams,
    cancellation: &CancellationFlag,
) -> OptimizationResult {
    let dims = bounds.len();
    let mut rng = rand::thread_rng();

    let random_position = |rng: &mut rand::rngs::ThreadRng| -> Vec<f64> {
        bounds.iter().map(|(lo, hi)| rng.gen_range(*lo..=*hi)).collect()
    };

    let mut sources: Vec<FoodSource> = (0..params.num_sources.max(1))
        .map(|_| {
            let position = random_position(&mut rng);
            let f = fitness(&position);
            FoodSource {
                position,
                fitness: f,
                visit_count: 0,
            }
        })
        .collect();

    let mut best_position = sources
        .iter()
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .map(|s| s.position.clone())
        .unwrap_or_default();
    let mut best_fitness = sources.iter().map(|s| s.fitness).fold(f64::MIN, f64::max);

    let mut convergence_trace = Vec::with_capacity(params.iterations);
    let mut iterations_run = 0;
    let mut cancelled = false;

    for _ in 0..params.iterations {
        if cancellation.is_cancelled() {
            cancelled = true;
            break;
        }
        iterations_run += 1;

        // Employed bees phase.
        let n = sources.len();
        for i in 0..n {
            perturb_source(&mut sources, i, dims, &fitness, &mut rng);
        }

        // Onlooker bees phase: probability proportional to (shifted) fitness.
        let min_fitness = sources.iter().map(|s| s.fitness).fold(f64::MAX, f64::min);
        let shifted: Vec<f64> = sources.iter().map(|s| s.fitness - min_fitness + 1e-9).collect();
        let total: f64 = shifted.iter().sum();
        if total > 0.0 {
            for _ in 0..n {
                let mut pick = rng.gen_range(0.0..total);
                let mut chosen = n - 1;
                for (idx, weight) in shifted.iter().enumerate() {
                    if pick < *weight {
                        chosen = idx;
                        break;
                    }
                    pick -= weight;
                }
                perturb_source(&mut sources, chosen, dims, &fitness, &mut rng);
            }
        }

        // Scout bees phase: reset sources that exceeded the abandonment limit.
        for source in &mut sources {
            if source.visit_count > params.abandonment_limit {
                source.position = random_position(&mut rng);
                source.fitness = fitness(&source.position);
                source.visit_count = 0;
            }
        }

        for source in &sources {
            if source.fitness > best_fitness {
                best_fitness = source.fitness;
                best_position = source.position.clone();
            }
        }
        convergence_trace.push(best_fitness);
    }

    OptimizationResult {
        best_position,
        best_fitness,
        convergence_trace: tail(&convergence_trace, 10),
        iterations_run,
        cancelled,
    }
}

fn perturb_source(
    sources: &mut [FoodSource],
    i: usize,
    dims: usize,
    fitness: &impl Fn(&[f64]) -> f64,
    rng: &mut impl Rng,
) {
    if sources.len() < 2 || dims == 0 {
        sources[i].visit_count += 1;
        return;
    }
    let dim = rng.gen_range(0..dims);
    let mut neighbor_idx = rng.gen_range(0..sources.len());
    while neighbor_idx == i {
        neighbor_idx = rng.gen_range(0..sources.len());
    }
    let phi: f64 = rng.gen_range(-1.0..=1.0);

    let mut candidate = sources[i].position.clone();
    candidate[dim] += phi * (sources[i].position[dim] - sources[neighbor_idx].position[dim]);
    let candidate_fitness = fitness(&candidate);

    if candidate_fitness > sources[i].fitness {
        sources[i].position = candidate;
        sources[i].fitness = candidate_fitness;
        sources[i].visit_count = 0;
    } else {
        sources[i].visit_count += 1;
    }
}

fn tail(values: &[f64], n: usize) -> Vec<f64> {
    let start = values.len().saturating_sub(n);
    values[start..].to_vec()
}

/// Democratic swarm task mode (§4.D): each eligible agent proposes a
/// candidate solution with a confidence; the Vote Aggregator selects the
/// winner under the swarm's configured strategy.
pub fn run_democratic_task(
    candidates: Vec<(String, String, f64)>,
    config: &VoterConfig,
    total_agents: usize,
) -> crate::vote::VoteResult {
    let votes: Vec<Vote> = candidates
        .into_iter()
        .map(|(voter_id, choice, confidence)| Vote::single(voter_id, choice).with_confidence(confidence))
        .collect();
    aggregate(votes, config, total_agents)
}

/// Builds an adjacency map suitable for [`run_aco`] from a flat list of
/// `(node_id, prerequisite_ids)` pairs — generalizes `agents/swarm.py`'s
/// task-dependency-graph builder without coupling this module to the Crew
/// Scheduler's `Task` type. Edges point from prerequisite to dependent,
/// i.e. the direction work can flow.
pub fn build_task_graph(nodes: &[(String, Vec<String>)]) -> HashMap<String, Vec<String>> {
    let mut graph: HashMap<String, Vec<String>> = HashMap::new();
    for (id, _) in nodes {
        graph.entry(id.clone()).or_default();
    }
    for (id, prereqs) in nodes {
        for prereq in prereqs {
            graph.entry(prereq.clone()).or_default().push(id.clone());
        }
    }
    graph
}

/// A simple load-balancing objective for ABC allocation search: higher is
/// better, maximized when per-worker loads are most even (negative variance).
pub fn objective_for_allocation(loads: &[f64]) -> f64 {
    if loads.is_empty() {
        return 0.0;
    }
    let mean = loads.iter().sum::<f64>() / loads.len() as f64;
    let variance = loads.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / loads.len() as f64;
    -variance
}

/// A PSO fitness closure scoring an assignment vector (one weight per agent)
/// against how well each agent's declared expertise matches the task's
/// required capability count — generalizes `agents/swarm.py`'s
/// `coordinate_swarm` fitness-for-assignment hook.
pub fn fitness_for_assignment(expertise_weights: Vec<f64>, required: usize) -> impl Fn(&[f64]) -> f64 {
    move |position: &[f64]| {
        position
            .iter()
            .zip(expertise_weights.iter())
            .map(|(w, expertise)| w.clamp(0.0, 1.0) * expertise)
            .sum::<f64>()
            - (position.len() as f64 - required as f64).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        -x.iter().map(|v| v * v).sum::<f64>()
    }

    #[test]
    fn pso_global_best_is_monotonic_non_decreasing() {
        let bounds = vec![(-5.0, 5.0); 3];
        let flag = CancellationFlag::new();
        let result = run_pso(12, &bounds, sphere, PsoParams { iterations: 20, ..Default::default() }, &flag);

        let trace = &result.convergence_trace;
        for window in trace.windows(2) {
            assert!(window[1] >= window[0] - 1e-9, "{:?}", trace);
        }
        assert!(!result.cancelled);
    }

    #[test]
    fn pso_respects_cancellation() {
        let bounds = vec![(-1.0, 1.0); 2];
        let flag = CancellationFlag::new();
        flag.cancel();
        let result = run_pso(5, &bounds, sphere, PsoParams::default(), &flag);
        assert!(result.cancelled);
        assert_eq!(result.iterations_run, 0);
    }

    #[test]
    fn aco_finds_a_path_on_a_simple_graph() {
        let mut graph: HashMap<String, Vec<String>> = HashMap::new();
        graph.insert("A".into(), vec!["B".into(), "C".into()]);
        graph.insert("B".into(), vec!["D".into()]);
        graph.insert("C".into(), vec!["D".into()]);
        graph.insert("D".into(), vec![]);

        let flag = CancellationFlag::new();
        let result = run_aco(&graph, "A", "D", None, AcoParams { iterations: 10, ..Default::default() }, &flag);

        let path = result.best_path.expect("path should be found");
        assert_eq!(path.first().unwrap(), "A");
        assert_eq!(path.last().unwrap(), "D");
    }

    #[test]
    fn aco_returns_none_when_goal_unreachable() {
        let mut graph: HashMap<String, Vec<String>> = HashMap::new();
        graph.insert("A".into(), vec!["B".into()]);
        graph.insert("B".into(), vec![]);
        graph.insert("Z".into(), vec![]);

        let flag = CancellationFlag::new();
        let result = run_aco(&graph, "A", "Z", None, AcoParams { iterations: 5, ..Default::default() }, &flag);
        assert!(result.best_path.is_none());
    }

    #[test]
    fn abc_improves_or_holds_best_fitness_over_iterations() {
        let bounds = vec![(-5.0, 5.0); 2];
        let flag = CancellationFlag::new();
        let result = run_abc(&bounds, sphere, AbcParams { iterations: 15, ..Default::default() }, &flag);

        for window in result.convergence_trace.windows(2) {
            assert!(window[1] >= window[0] - 1e-9);
        }
    }

    #[test]
    fn democratic_task_delegates_to_vote_aggregator() {
        let candidates = vec![
            ("agent-1".to_string(), "alpha".to_string(), 0.8),
            ("agent-2".to_string(), "alpha".to_string(), 0.9),
            ("agent-3".to_string(), "beta".to_string(), 0.95),
        ];
        let result = run_democratic_task(candidates, &VoterConfig::default(), 3);
        assert_eq!(result.winner.as_deref(), Some("alpha"));
        assert!(result.consensus);
    }

    #[test]
    fn task_graph_points_from_prerequisite_to_dependent() {
        let nodes = vec![
            ("t1".to_string(), vec![]),
            ("t2".to_string(), vec!["t1".to_string()]),
        ];
        let graph = build_task_graph(&nodes);
        assert_eq!(graph["t1"], vec!["t2".to_string()]);
    }

    #[test]
    fn convergence_trace_caps_at_ten() {
        let mut swarm = Swarm::new(SwarmConfig::new("s1", SwarmBehavior::Pso));
        for i in 0..25 {
            swarm.iteration_history.push(ConvergencePoint { iteration: i, best_fitness: i as f64 });
        }
        assert_eq!(swarm.convergence_trace().len(), 10);
        assert_eq!(swarm.convergence_trace().first().unwrap().iteration, 15);
    }
}
