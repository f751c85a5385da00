//! Run Swarm use case — drives a [`Swarm`]'s configured behavior
//! (PSO/ACO/ABC/Democratic) directly, bypassing the Problem Solver.

use maoc_domain::cancellation::CancellationFlag;
use maoc_domain::swarm::{
    AbcParams, AcoParams, ConvergencePoint, OptimizationResult, PathResult, PsoParams, Swarm, SwarmBehavior,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunSwarmError {
    #[error("behavior {0:?} does not match the supplied workload")]
    UnsupportedBehavior(SwarmBehavior),
}

/// Fitness/graph inputs a population-based run needs, supplied by the caller
/// since the swarm entity itself carries no problem-specific payload.
pub enum SwarmWorkload<'a> {
    Pso {
        num_particles: usize,
        bounds: &'a [(f64, f64)],
        fitness: &'a (dyn Fn(&[f64]) -> f64 + Sync),
        params: PsoParams,
    },
    Aco {
        graph: &'a std::collections::HashMap<String, Vec<String>>,
        source: &'a str,
        goal: &'a str,
        params: AcoParams,
    },
    Abc {
        bounds: &'a [(f64, f64)],
        fitness: &'a (dyn Fn(&[f64]) -> f64 + Sync),
        params: AbcParams,
    },
}

pub enum SwarmRunOutcome {
    Optimization(OptimizationResult),
    Path(PathResult),
}

fn record_trace(swarm: &mut Swarm, trace: &[f64]) {
    let offset = swarm.iteration_history.len();
    swarm
        .iteration_history
        .extend(trace.iter().enumerate().map(|(i, f)| ConvergencePoint {
            iteration: offset + i,
            best_fitness: *f,
        }));
}

pub struct RunSwarmUseCase;

impl Default for RunSwarmUseCase {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSwarmUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        swarm: &mut Swarm,
        workload: SwarmWorkload<'_>,
        cancellation: &CancellationFlag,
    ) -> Result<SwarmRunOutcome, RunSwarmError> {
        info!(swarm_id = %swarm.id, behavior = ?swarm.config.behavior, "running swarm");

        match (swarm.config.behavior, workload) {
            (
                SwarmBehavior::Pso,
                SwarmWorkload::Pso { num_particles, bounds, fitness, params },
            ) => {
                let result = maoc_domain::swarm::run_pso(num_particles, bounds, fitness, params, cancellation);
                record_trace(swarm, &result.convergence_trace);
                Ok(SwarmRunOutcome::Optimization(result))
            }
            (SwarmBehavior::Aco, SwarmWorkload::Aco { graph, source, goal, params }) => {
                let result = maoc_domain::swarm::run_aco(graph, source, goal, None, params, cancellation);
                record_trace(swarm, &result.convergence_trace);
                Ok(SwarmRunOutcome::Path(result))
            }
            (SwarmBehavior::Abc, SwarmWorkload::Abc { bounds, fitness, params }) => {
                let result = maoc_domain::swarm::run_abc(bounds, fitness, params, cancellation);
                record_trace(swarm, &result.convergence_trace);
                Ok(SwarmRunOutcome::Optimization(result))
            }
            (behavior, _) => Err(RunSwarmError::UnsupportedBehavior(behavior)),
        }
    }
}
