//! Progress notification port.
//!
//! Defines the interface use cases call into as a Solve/Crew run/Swarm run
//! advances. Implementations live in the presentation layer.

use maoc_domain::crew::{CrewState, TaskStatus};
use maoc_domain::problem::{Approach, Complexity};
use maoc_domain::swarm::ConvergencePoint;

/// Callback for progress updates during orchestration.
pub trait ProgressNotifier: Send + Sync {
    /// Called once the Problem Solver has classified complexity and picked
    /// an approach.
    fn on_classified(&self, _complexity: Complexity, _approach: Approach) {}

    /// Called whenever a crew task changes status.
    fn on_task_status(&self, _task_title: &str, _status: TaskStatus) {}

    /// Called whenever a crew's lifecycle state changes.
    fn on_crew_state(&self, _state: CrewState) {}

    /// Called after each swarm iteration with the running convergence point.
    fn on_swarm_iteration(&self, _point: ConvergencePoint) {}

    /// Called when the solver produces its final solution.
    fn on_solution(&self, _confidence: f64, _consensus_achieved: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed.
pub struct NoProgress;

impl ProgressNotifier for NoProgress {}
