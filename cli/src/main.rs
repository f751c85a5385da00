//! CLI entrypoint for the Multi-Agent Orchestration Core.
//!
//! Wires the four layers together using dependency injection: the
//! infrastructure layer's `SimulatedExecutor` stands in for a real agent
//! backend, since this core has no LLM gateway of its own.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use maoc_application::ports::progress::NoProgress;
use maoc_application::use_cases::run_swarm::{SwarmRunOutcome, SwarmWorkload};
use maoc_application::use_cases::shared::OrchestrationRuntime;
use maoc_application::use_cases::solve_problem::SolveProblemInput;
use maoc_application::use_cases::{RunCrewUseCase, RunSwarmUseCase, SolveProblemUseCase};
use maoc_domain::agent::AgentType;
use maoc_domain::cancellation::CancellationFlag;
use maoc_domain::crew::{Crew, CrewConfig, ProcessMode, Role, Task};
use maoc_domain::problem::{Problem, ProblemType};
use maoc_domain::swarm::{AbcParams, AcoParams, PsoParams, Swarm, SwarmBehavior, SwarmConfig};
use maoc_domain::vote::{Vote, VoterConfig, VotingStrategy, aggregate};
use maoc_infrastructure::demo::SimulatedExecutor;
use maoc_presentation::cli::commands::{Command, ProblemTypeArg, ProcessModeArg, SwarmBehaviorArg, VotingStrategyArg};
use maoc_presentation::{Cli, ConsoleFormatter, ConsoleProgress, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    maoc_infrastructure::logging::init_tracing(cli.verbose);
    info!("Starting Multi-Agent Orchestration Core");

    match cli.command {
        Command::Solve { title, description, problem_type, agents } => {
            run_solve(title, description, problem_type, agents, cli.output, cli.quiet).await
        }
        Command::Crew { process_mode, members, tasks } => {
            run_crew(process_mode, members, tasks, cli.output).await
        }
        Command::Swarm { behavior, iterations, population } => {
            run_swarm(behavior, iterations, population, cli.output)
        }
        Command::Vote { strategy, votes, threshold, min_votes, require_quorum, quorum_share } => {
            run_vote(strategy, votes, threshold, min_votes, require_quorum, quorum_share, cli.output)
        }
    }
}

fn problem_type_from_arg(arg: ProblemTypeArg) -> ProblemType {
    match arg {
        ProblemTypeArg::Development => ProblemType::Development,
        ProblemTypeArg::Analysis => ProblemType::Analysis,
        ProblemTypeArg::Design => ProblemType::Design,
        ProblemTypeArg::Optimization => ProblemType::Optimization,
        ProblemTypeArg::Troubleshooting => ProblemType::Troubleshooting,
        ProblemTypeArg::Planning => ProblemType::Planning,
        ProblemTypeArg::Creative => ProblemType::Creative,
        ProblemTypeArg::General => ProblemType::General,
    }
}

fn process_mode_from_arg(arg: ProcessModeArg) -> ProcessMode {
    match arg {
        ProcessModeArg::Sequential => ProcessMode::Sequential,
        ProcessModeArg::Parallel => ProcessMode::Parallel,
        ProcessModeArg::Hierarchical => ProcessMode::Hierarchical,
        ProcessModeArg::Democratic => ProcessMode::Democratic,
    }
}

fn voting_strategy_from_arg(arg: VotingStrategyArg) -> VotingStrategy {
    match arg {
        VotingStrategyArg::Majority => VotingStrategy::Majority,
        VotingStrategyArg::Plurality => VotingStrategy::Plurality,
        VotingStrategyArg::Unanimity => VotingStrategy::Unanimity,
        VotingStrategyArg::Weighted => VotingStrategy::Weighted,
        VotingStrategyArg::Threshold => VotingStrategy::Threshold,
        VotingStrategyArg::Supermajority => VotingStrategy::Supermajority,
        VotingStrategyArg::RankedChoice => VotingStrategy::RankedChoice,
        VotingStrategyArg::Approval => VotingStrategy::Approval,
    }
}

async fn run_solve(
    title: String,
    description: String,
    problem_type: ProblemTypeArg,
    agent_count: usize,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if agent_count == 0 {
        bail!("--agents must be at least 1");
    }

    let runtime = OrchestrationRuntime::new();
    for i in 0..agent_count {
        let executor = Arc::new(SimulatedExecutor::new(format!("agent-{i}"), AgentType::General));
        runtime.register_agent(format!("agent-{i}"), AgentType::General, executor).await;
    }

    let problem = Problem::new(title, description, problem_type_from_arg(problem_type));
    let use_case = SolveProblemUseCase::new(runtime);
    let input = SolveProblemInput::new(problem);

    let solution = if quiet {
        use_case.execute_with_progress(input, &NoProgress).await?
    } else {
        use_case.execute_with_progress(input, &ConsoleProgress).await?
    };

    match output {
        OutputFormat::Console => println!("{}", ConsoleFormatter::format_solution(&solution)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&solution.payload)),
    }
    Ok(())
}

async fn run_crew(process_mode: ProcessModeArg, member_count: usize, task_count: usize, output: OutputFormat) -> Result<()> {
    if member_count == 0 {
        bail!("--members must be at least 1");
    }
    if task_count == 0 {
        bail!("--tasks must be at least 1");
    }

    let process_mode = process_mode_from_arg(process_mode);
    let runtime = OrchestrationRuntime::new();
    let mut crew = Crew::new(CrewConfig {
        process_mode,
        ..CrewConfig::default()
    });

    for i in 0..member_count {
        let executor = Arc::new(SimulatedExecutor::new(format!("member-{i}"), AgentType::General));
        let agent_id = runtime.register_agent(format!("member-{i}"), AgentType::General, executor).await;
        let role = if i == 0 { Role::Manager } else { Role::Specialist };
        crew.add_member(agent_id, role)?;
    }

    let mut first_task_id = None;
    for i in 0..task_count {
        let mut task = Task::new(format!("task-{i}"), format!("demo task #{i}"));
        if let Some(first) = &first_task_id {
            if i > 0 {
                task = task.with_prerequisite(first.clone());
            }
        }
        let id = crew.add_task(task);
        if i == 0 {
            first_task_id = Some(id);
        }
    }

    let use_case = RunCrewUseCase::new(runtime);
    let summary = use_case.execute(&mut crew).await?;

    match output {
        OutputFormat::Console => println!("{}", ConsoleFormatter::format_crew_summary(&summary)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&summary.completed)),
    }
    Ok(())
}

/// Built-in benchmark objective for PSO/ABC demo runs: the sphere function,
/// minimized at the origin, negated here since the swarm formulas track a
/// maximal fitness.
fn sphere_fitness(position: &[f64]) -> f64 {
    -position.iter().map(|x| x * x).sum::<f64>()
}

fn run_swarm(behavior: SwarmBehaviorArg, iterations: usize, population: usize, output: OutputFormat) -> Result<()> {
    let cancellation = CancellationFlag::new();
    let use_case = RunSwarmUseCase::new();

    match behavior {
        SwarmBehaviorArg::Pso => {
            let bounds = vec![(-10.0, 10.0); 5];
            let mut swarm = Swarm::new(SwarmConfig::new("demo-pso", SwarmBehavior::Pso));
            let params = PsoParams { iterations, ..PsoParams::default() };
            let outcome = use_case.execute(
                &mut swarm,
                SwarmWorkload::Pso { num_particles: population, bounds: &bounds, fitness: &sphere_fitness, params },
                &cancellation,
            )?;
            let SwarmRunOutcome::Optimization(result) = outcome else {
                unreachable!("PSO always yields an OptimizationResult");
            };
            match output {
                OutputFormat::Console => println!("{}", ConsoleFormatter::format_optimization_result(&result)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&result.best_fitness)),
            }
        }
        SwarmBehaviorArg::Abc => {
            let bounds = vec![(-10.0, 10.0); 5];
            let mut swarm = Swarm::new(SwarmConfig::new("demo-abc", SwarmBehavior::Abc));
            let params = AbcParams { num_sources: population, iterations, ..AbcParams::default() };
            let outcome = use_case.execute(
                &mut swarm,
                SwarmWorkload::Abc { bounds: &bounds, fitness: &sphere_fitness, params },
                &cancellation,
            )?;
            let SwarmRunOutcome::Optimization(result) = outcome else {
                unreachable!("ABC always yields an OptimizationResult");
            };
            match output {
                OutputFormat::Console => println!("{}", ConsoleFormatter::format_optimization_result(&result)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&result.best_fitness)),
            }
        }
        SwarmBehaviorArg::Aco => {
            let graph: HashMap<String, Vec<String>> = [
                ("A".to_string(), vec!["B".to_string(), "C".to_string()]),
                ("B".to_string(), vec!["D".to_string()]),
                ("C".to_string(), vec!["D".to_string()]),
                ("D".to_string(), vec!["E".to_string()]),
            ]
            .into_iter()
            .collect();
            let mut swarm = Swarm::new(SwarmConfig::new("demo-aco", SwarmBehavior::Aco));
            let params = AcoParams { num_ants: population, iterations, ..AcoParams::default() };
            let outcome = use_case.execute(
                &mut swarm,
                SwarmWorkload::Aco { graph: &graph, source: "A", goal: "E", params },
                &cancellation,
            )?;
            let SwarmRunOutcome::Path(result) = outcome else {
                unreachable!("ACO always yields a PathResult");
            };
            match output {
                OutputFormat::Console => println!("{}", ConsoleFormatter::format_path_result(&result)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&result.best_path)),
            }
        }
    }

    Ok(())
}

fn run_vote(
    strategy: VotingStrategyArg,
    pairs: Vec<(String, String)>,
    threshold: Option<f64>,
    min_votes: usize,
    require_quorum: bool,
    quorum_share: f64,
    output: OutputFormat,
) -> Result<()> {
    if pairs.is_empty() {
        bail!("at least one voter=choice pair is required");
    }

    let votes: Vec<Vote> = pairs.into_iter().map(|(voter, choice)| Vote::single(voter, choice)).collect();
    let total_agents = votes.len();
    let config = VoterConfig {
        strategy: voting_strategy_from_arg(strategy),
        threshold,
        min_votes,
        require_quorum,
        quorum_share,
    };

    let result = aggregate(votes, &config, total_agents);

    match output {
        OutputFormat::Console => println!("{}", ConsoleFormatter::format_vote_result(&result)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&result.winner)),
    }
    Ok(())
}
