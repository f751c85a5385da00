//! Console [`ProgressNotifier`] implementation — a plain, line-oriented
//! reporter for the solver/crew/swarm lifecycle events this core emits.

use colored::Colorize;
use maoc_application::ports::progress::ProgressNotifier;
use maoc_domain::crew::{CrewState, TaskStatus};
use maoc_domain::problem::{Approach, Complexity};
use maoc_domain::swarm::ConvergencePoint;

/// Prints one line per lifecycle event to stdout.
pub struct ConsoleProgress;

impl ProgressNotifier for ConsoleProgress {
    fn on_classified(&self, complexity: Complexity, approach: Approach) {
        println!(
            "{} complexity={:?} approach={:?}",
            "->".cyan(),
            complexity,
            approach
        );
    }

    fn on_task_status(&self, task_title: &str, status: TaskStatus) {
        let marker = match status {
            TaskStatus::Completed => "v".green(),
            TaskStatus::Failed => "x".red(),
            TaskStatus::Running => "~".yellow(),
            _ => "o".dimmed(),
        };
        println!("  {marker} {task_title} ({status:?})");
    }

    fn on_crew_state(&self, state: CrewState) {
        println!("{} crew state: {:?}", "->".cyan(), state);
    }

    fn on_swarm_iteration(&self, point: ConvergencePoint) {
        println!(
            "  {} iteration {} best_fitness={:.6}",
            "*".dimmed(),
            point.iteration,
            point.best_fitness
        );
    }

    fn on_solution(&self, confidence: f64, consensus_achieved: bool) {
        println!(
            "{} solution ready: confidence={:.2} consensus={}",
            "=>".green().bold(),
            confidence,
            consensus_achieved
        );
    }
}
