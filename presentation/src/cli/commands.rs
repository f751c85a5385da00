//! CLI command definitions — a multi-subcommand entry point, one subcommand
//! per engine this core exposes (Solve, Crew, Swarm, Vote).

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for orchestration results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console output.
    Console,
    /// JSON output.
    Json,
}

/// Which population-based algorithm the `swarm` subcommand should run.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SwarmBehaviorArg {
    Pso,
    Aco,
    Abc,
}

/// Which crew process mode the `crew` subcommand should run.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProcessModeArg {
    Sequential,
    Parallel,
    Hierarchical,
    Democratic,
}

/// Which vote aggregation strategy the `vote` subcommand should run.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VotingStrategyArg {
    Majority,
    Plurality,
    Unanimity,
    Weighted,
    Threshold,
    Supermajority,
    RankedChoice,
    Approval,
}

/// Which problem domain the `solve` subcommand should classify against.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProblemTypeArg {
    Development,
    Analysis,
    Design,
    Optimization,
    Troubleshooting,
    Planning,
    Creative,
    General,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a problem to the Problem Solver with simulated demo agents.
    Solve {
        /// Short problem title.
        title: String,
        /// Problem description (drives complexity classification).
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short = 't', long, value_enum, default_value = "general")]
        problem_type: ProblemTypeArg,
        /// Number of simulated agents to register before solving.
        #[arg(long, default_value_t = 3)]
        agents: usize,
    },

    /// Run a pre-assembled crew of simulated agents through a demo task set.
    Crew {
        #[arg(short, long, value_enum, default_value = "parallel")]
        process_mode: ProcessModeArg,
        /// Number of simulated crew members.
        #[arg(long, default_value_t = 3)]
        members: usize,
        /// Number of demo tasks to generate.
        #[arg(long, default_value_t = 4)]
        tasks: usize,
    },

    /// Run a population-based optimizer over a built-in benchmark function.
    Swarm {
        #[arg(short, long, value_enum, default_value = "pso")]
        behavior: SwarmBehaviorArg,
        #[arg(long, default_value_t = 50)]
        iterations: usize,
        /// Particle/ant/source count, depending on behavior.
        #[arg(long, default_value_t = 20)]
        population: usize,
    },

    /// Aggregate a set of votes cast on the command line.
    Vote {
        #[arg(short, long, value_enum, default_value = "majority")]
        strategy: VotingStrategyArg,
        /// One vote per `voter=choice` pair, repeatable.
        #[arg(value_parser = parse_vote_pair, num_args = 1..)]
        votes: Vec<(String, String)>,
        /// Pass threshold for the `threshold` strategy, in [0, 1].
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long, default_value_t = 1)]
        min_votes: usize,
        #[arg(long)]
        require_quorum: bool,
        #[arg(long, default_value_t = 0.5)]
        quorum_share: f64,
    },
}

fn parse_vote_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(voter, choice)| (voter.to_string(), choice.to_string()))
        .ok_or_else(|| format!("expected voter=choice, got `{raw}`"))
}

/// CLI arguments for the Multi-Agent Orchestration Core.
#[derive(Parser, Debug)]
#[command(name = "maoc")]
#[command(author, version, about = "Multi-Agent Orchestration Core - swarm, crew and voting engines")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML configuration file (overrides project/env config).
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "console", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vote_pair_splits_on_equals() {
        assert_eq!(
            parse_vote_pair("alice=yes").unwrap(),
            ("alice".to_string(), "yes".to_string())
        );
        assert!(parse_vote_pair("no-equals-sign").is_err());
    }

    #[test]
    fn cli_parses_a_vote_subcommand() {
        let cli = Cli::parse_from([
            "maoc", "vote", "--strategy", "majority", "a=yes", "b=yes", "c=no",
        ]);
        match cli.command {
            Command::Vote { votes, .. } => assert_eq!(votes.len(), 3),
            _ => panic!("expected Vote command"),
        }
    }
}
