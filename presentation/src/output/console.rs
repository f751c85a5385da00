//! Console output formatter — renders the four result shapes this core
//! produces: a [`Solution`], a [`VoteResult`], a [`CrewRunSummary`], and a
//! swarm [`OptimizationResult`]/[`PathResult`].

use colored::Colorize;
use maoc_domain::crew::CrewRunSummary;
use maoc_domain::problem::Solution;
use maoc_domain::swarm::{OptimizationResult, PathResult};
use maoc_domain::vote::VoteResult;

/// Formats orchestration results for console display.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format_solution(solution: &Solution) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Solution"));
        out.push_str(&format!(
            "\n{} {:?}\n{} {:.2}\n{} {:.2}\n{} {}\n{} {}\n{} {}\n{} {}\n",
            "Approach:".cyan().bold(),
            solution.approach,
            "Confidence:".cyan().bold(),
            solution.confidence,
            "Quality:".cyan().bold(),
            solution.quality_score,
            "Consensus achieved:".cyan().bold(),
            solution.consensus_achieved,
            "Agents engaged:".cyan().bold(),
            solution.agents_engaged.len(),
            "Duration (ms):".cyan().bold(),
            solution.duration_ms,
            "Cancelled:".cyan().bold(),
            solution.cancelled,
        ));
        if let Some(vote) = &solution.final_vote {
            out.push_str(&format!("\n{}\n", "Final vote:".yellow().bold()));
            out.push_str(&Self::format_vote_result(vote));
        }
        out.push_str(&Self::footer());
        out
    }

    pub fn format_vote_result(result: &VoteResult) -> String {
        let status = if result.passed {
            "PASSED".green().bold()
        } else {
            "NOT PASSED".red().bold()
        };
        format!(
            "{} {:?}   {} {}\n{} {}   {} {:.1}%   {} {}\n",
            "Strategy:".cyan(),
            result.strategy,
            "Status:".cyan(),
            status,
            "Winner:".cyan(),
            result.winner.as_deref().unwrap_or("<none>"),
            "Share:".cyan(),
            result.winning_share * 100.0,
            "Rounds:".cyan(),
            result.rounds,
        )
    }

    pub fn format_crew_summary(summary: &CrewRunSummary) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Crew Run Summary"));
        out.push_str(&format!(
            "\n{} {}\n{} {}\n{} {}\n",
            "Completed:".green().bold(),
            summary.completed.len(),
            "Failed:".red().bold(),
            summary.failed.len(),
            "Skipped:".yellow().bold(),
            summary.skipped.len(),
        ));
        for (task_id, vote) in &summary.votes {
            out.push_str(&format!("\n{} {}\n", format!("Task {task_id:?} vote:").dimmed(), ""));
            out.push_str(&Self::format_vote_result(vote));
        }
        out.push_str(&Self::footer());
        out
    }

    pub fn format_optimization_result(result: &OptimizationResult) -> String {
        format!(
            "{}\n{} {:.6}\n{} {}\n{} {}\n",
            Self::header("Swarm Optimization Result"),
            "Best fitness:".cyan().bold(),
            result.best_fitness,
            "Iterations run:".cyan().bold(),
            result.iterations_run,
            "Cancelled:".cyan().bold(),
            result.cancelled,
        )
    }

    pub fn format_path_result(result: &PathResult) -> String {
        let path = result
            .best_path
            .as_ref()
            .map(|p| p.join(" -> "))
            .unwrap_or_else(|| "<no path found>".to_string());
        format!(
            "{}\n{} {}\n{} {}\n{} {}\n",
            Self::header("Swarm Path Result"),
            "Best path:".cyan().bold(),
            path,
            "Best length:".cyan().bold(),
            result.best_length.map(|n| n.to_string()).unwrap_or_else(|| "n/a".to_string()),
            "Iterations run:".cyan().bold(),
            result.iterations_run,
        )
    }

    pub fn format_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maoc_domain::ids::ProblemId;
    use maoc_domain::problem::Approach;

    #[test]
    fn format_solution_includes_approach_and_confidence() {
        let solution = Solution {
            problem_id: ProblemId::generate(),
            approach: Approach::SingleAgent,
            payload: serde_json::json!({}),
            confidence: 0.8,
            quality_score: 0.9,
            final_vote: None,
            consensus_achieved: false,
            agents_engaged: vec![],
            swarms_used: 0,
            crews_used: 0,
            duration_ms: 10,
            iterations: 1,
            cancelled: false,
        };
        let rendered = ConsoleFormatter::format_solution(&solution);
        assert!(rendered.contains("SingleAgent"));
        assert!(rendered.contains("0.80") || rendered.contains("0.8"));
    }
}
