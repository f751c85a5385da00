//! Problem Solver (§4.F) — the top-level orchestrator. Classifies a
//! [`Problem`], selects an approach, decomposes it, executes via the Swarm
//! Coordinator and/or Crew Scheduler, optionally runs the Consensus Builder,
//! and assembles a [`Solution`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentType;
use crate::cancellation::CancellationFlag;
use crate::consensus::{ConsensusBuilder, ConsensusConfig, Proposal};
use crate::crew::{Crew, CrewConfig, CrewScheduler, ProcessMode, Role, Task as CrewTask};
use crate::error::OrchestrationError;
use crate::executor::{AgentExecutor, TaskContext};
use crate::ids::{AgentId, ProblemId, SubProblemId};
use crate::metrics::MetricsRegistry;
use crate::pool::AgentPool;
use crate::swarm::{Swarm, SwarmBehavior, SwarmConfig, run_democratic_task};
use crate::vote::{Vote, VoterConfig, aggregate};

/// Closed enumeration of problem domains (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    Development,
    Analysis,
    Design,
    Optimization,
    Troubleshooting,
    Planning,
    Creative,
    General,
}

/// Complexity tier, either computed or supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    HighlyComplex,
}

/// Execution approach the solver selects for a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    SingleAgent,
    Swarm,
    Crew,
    MultiSwarm,
    Hybrid,
}

/// A problem submitted to the solver. Immutable after submission.
#[derive(Debug, Clone)]
pub struct Problem {
    pub id: ProblemId,
    pub title: String,
    pub description: String,
    pub problem_type: ProblemType,
    pub complexity_override: Option<Complexity>,
    pub priority: i32,
    pub required_agent_types: Vec<AgentType>,
    pub required_capabilities: Vec<String>,
    pub context: Value,
}

impl Problem {
    pub fn new(title: impl Into<String>, description: impl Into<String>, problem_type: ProblemType) -> Self {
        Self {
            id: ProblemId::generate(),
            title: title.into(),
            description: description.into(),
            problem_type,
            complexity_override: None,
            priority: 0,
            required_agent_types: Vec::new(),
            required_capabilities: Vec::new(),
            context: Value::Null,
        }
    }

    pub fn with_required_agent_types(mut self, types: Vec<AgentType>) -> Self {
        self.required_agent_types = types;
        self
    }

    pub fn with_required_capabilities(mut self, caps: Vec<String>) -> Self {
        self.required_capabilities = caps;
        self
    }

    pub fn with_complexity_override(mut self, complexity: Complexity) -> Self {
        self.complexity_override = Some(complexity);
        self
    }

    /// `len(capabilities) + 2*len(requiredAgentTypes) + len(description)/200`.
    fn complexity_score(&self) -> f64 {
        self.required_capabilities.len() as f64
            + 2.0 * self.required_agent_types.len() as f64
            + self.description.len() as f64 / 200.0
    }

    pub fn classify_complexity(&self) -> Complexity {
        if let Some(complexity) = self.complexity_override {
            return complexity;
        }
        let score = self.complexity_score();
        if score <= 2.0 {
            Complexity::Simple
        } else if score <= 5.0 {
            Complexity::Moderate
        } else if score <= 10.0 {
            Complexity::Complex
        } else {
            Complexity::HighlyComplex
        }
    }
}

/// One decomposed piece of a [`Problem`].
#[derive(Debug, Clone)]
pub struct SubProblem {
    pub id: SubProblemId,
    pub parent_id: ProblemId,
    pub title: String,
    pub description: String,
    pub required_agent_types: Vec<AgentType>,
    pub depends_on: Vec<SubProblemId>,
}

/// Pick the approach for a (complexity, problem_type) pair (§4.F step 2).
pub fn select_approach(complexity: Complexity, problem_type: ProblemType) -> Approach {
    use Complexity::*;
    use ProblemType::*;
    match (complexity, problem_type) {
        (Simple, _) => Approach::SingleAgent,
        (Moderate, Creative | Analysis) => Approach::Swarm,
        (Moderate, _) => Approach::Crew,
        (Complex, Development | Design) => Approach::Hybrid,
        (Complex, _) => Approach::MultiSwarm,
        (HighlyComplex, _) => Approach::Hybrid,
    }
}

/// Decompose a problem into sub-problems (§4.F step 3).
pub fn decompose(problem: &Problem) -> Vec<SubProblem> {
    if !problem.required_agent_types.is_empty() {
        problem
            .required_agent_types
            .iter()
            .map(|agent_type| SubProblem {
                id: SubProblemId::generate(),
                parent_id: problem.id.clone(),
                title: format!("{} — {} phase", problem.title, agent_type),
                description: problem.description.clone(),
                required_agent_types: vec![*agent_type],
                depends_on: Vec::new(),
            })
            .collect()
    } else {
        ["analysis", "implementation", "testing"]
            .iter()
            .map(|phase| SubProblem {
                id: SubProblemId::generate(),
                parent_id: problem.id.clone(),
                title: format!("{} — {} phase", problem.title, phase),
                description: problem.description.clone(),
                required_agent_types: Vec::new(),
                depends_on: Vec::new(),
            })
            .collect()
    }
}

/// Final assembled result of a `Solve` call (§3).
#[derive(Debug, Clone)]
pub struct Solution {
    pub problem_id: ProblemId,
    pub approach: Approach,
    pub payload: Value,
    pub confidence: f64,
    pub quality_score: f64,
    pub final_vote: Option<crate::vote::VoteResult>,
    pub consensus_achieved: bool,
    pub agents_engaged: Vec<AgentId>,
    pub swarms_used: usize,
    pub crews_used: usize,
    pub duration_ms: u64,
    pub iterations: usize,
    pub cancelled: bool,
}

/// Tunables for the optional consensus phase and sub-execution sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    #[serde(default = "default_enable_consensus_phase")]
    pub enable_consensus_phase: bool,
    #[serde(default)]
    pub consensus: ConsensusConfig,
    #[serde(default)]
    pub voter_config: VoterConfig,
    #[serde(default = "default_max_swarm_agents")]
    pub max_swarm_agents: usize,
}

fn default_enable_consensus_phase() -> bool {
    true
}

fn default_max_swarm_agents() -> usize {
    5
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            enable_consensus_phase: true,
            consensus: ConsensusConfig::default(),
            voter_config: VoterConfig::default(),
            max_swarm_agents: 5,
        }
    }
}

/// Sequential `Solve(problem)` pipeline owner.
pub struct ProblemSolver {
    pub config: SolverConfig,
}

impl Default for ProblemSolver {
    fn default() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }
}

impl ProblemSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// First agent whose type is among `required_agent_types`, else any
    /// available agent (§4.F step 4, SingleAgent branch).
    fn select_best_agent(&self, problem: &Problem, pool: &AgentPool) -> Option<AgentId> {
        for agent_type in &problem.required_agent_types {
            if let Some(agent) = pool.match_by_type(*agent_type, 1).into_iter().next() {
                return Some(agent.id.clone());
            }
        }
        pool.all().find(|a| a.is_available()).map(|a| a.id.clone())
    }

    /// Up to `limit` agents matching the sub-problem's required types,
    /// falling back to any available agents to fill the quota.
    fn select_agents_for_problem(
        &self,
        required_types: &[AgentType],
        limit: usize,
        pool: &AgentPool,
    ) -> Vec<AgentId> {
        let mut ids = Vec::new();
        for agent_type in required_types {
            for agent in pool.match_by_type(*agent_type, limit - ids.len()) {
                if !ids.contains(&agent.id) {
                    ids.push(agent.id.clone());
                }
                if ids.len() >= limit {
                    return ids;
                }
            }
        }
        if ids.is_empty() {
            for agent in pool.all() {
                if agent.is_available() {
                    ids.push(agent.id.clone());
                }
                if ids.len() >= limit {
                    break;
                }
            }
        }
        ids
    }

    pub async fn solve(
        &self,
        problem: Problem,
        pool: &mut AgentPool,
        executors: &HashMap<AgentId, Arc<dyn AgentExecutor>>,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
    ) -> Result<Solution, OrchestrationError> {
        self.solve_with_cancellation(problem, pool, executors, metrics, now_ms, &CancellationFlag::new())
            .await
    }

    /// As [`Self::solve`], but threading a cooperative cancellation signal
    /// into every nested crew run (§5: every long-running operation accepts
    /// one). Swarm sub-executions here are single-shot democratic votes, not
    /// iterative optimizations, so there is no iteration loop to check.
    pub async fn solve_with_cancellation(
        &self,
        problem: Problem,
        pool: &mut AgentPool,
        executors: &HashMap<AgentId, Arc<dyn AgentExecutor>>,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
        cancellation: &CancellationFlag,
    ) -> Result<Solution, OrchestrationError> {
        let complexity = problem.classify_complexity();
        let approach = select_approach(complexity, problem.problem_type);
        let sub_problems = decompose(&problem);

        metrics.events.append(
            problem.id.to_string(),
            "classified",
            serde_json::json!({"complexity": format!("{complexity:?}"), "approach": format!("{approach:?}")}),
            now_ms,
        );

        let mut solution = match approach {
            Approach::SingleAgent => self.execute_single_agent(&problem, pool, executors).await?,
            Approach::Swarm => {
                self.execute_swarm(&problem, &sub_problems, pool, executors, now_ms)
                    .await?
            }
            Approach::Crew => {
                self.execute_crew(&problem, &sub_problems, pool, executors, metrics, now_ms, cancellation)
                    .await?
            }
            Approach::MultiSwarm => {
                self.execute_multi_swarm(&problem, &sub_problems, pool, executors, now_ms)
                    .await?
            }
            Approach::Hybrid => {
                self.execute_hybrid(&problem, &sub_problems, pool, executors, metrics, now_ms, cancellation)
                    .await?
            }
        };

        if cancellation.is_cancelled() {
            solution.cancelled = true;
        } else if self.config.enable_consensus_phase && !solution.consensus_achieved {
            self.run_consensus_phase(&mut solution)?;
        }

        metrics.solver.record(solution.confidence, solution.consensus_achieved);
        Ok(solution)
    }

    async fn execute_single_agent(
        &self,
        problem: &Problem,
        pool: &mut AgentPool,
        executors: &HashMap<AgentId, Arc<dyn AgentExecutor>>,
    ) -> Result<Solution, OrchestrationError> {
        let agent_id = self
            .select_best_agent(problem, pool)
            .ok_or(OrchestrationError::NoSuitableAgent)?;

        let reservation = pool.reserve(&agent_id, problem.id.to_string())?;
        let task = CrewTask::new(problem.title.clone(), problem.description.clone());
        let context = TaskContext::new();
        let outcome = match executors.get(&agent_id) {
            Some(executor) => executor.execute_task(&task, &context).await,
            None => Err(OrchestrationError::NoSuitableAgent),
        };
        pool.release(&reservation);
        let outcome = outcome?;

        Ok(Solution {
            problem_id: problem.id.clone(),
            approach: Approach::SingleAgent,
            payload: outcome.payload,
            confidence: 0.85,
            quality_score: outcome.quality_score,
            final_vote: None,
            consensus_achieved: false,
            agents_engaged: vec![agent_id],
            swarms_used: 0,
            crews_used: 0,
            duration_ms: 0,
            iterations: 0,
            cancelled: false,
        })
    }

    /// Have each agent propose a real candidate by invoking its `AgentExecutor`
    /// callback (§4.D democratic swarm task mode) — the candidate's choice and
    /// confidence are the callback's own payload and quality score, never a
    /// stand-in derived from the agent's historical metrics.
    async fn propose_candidates(
        agent_ids: &[AgentId],
        task: &CrewTask,
        executors: &HashMap<AgentId, Arc<dyn AgentExecutor>>,
    ) -> Vec<(String, String, f64)> {
        let context = TaskContext::new();
        let mut candidates = Vec::new();
        for agent_id in agent_ids {
            let Some(executor) = executors.get(agent_id) else {
                continue;
            };
            if let Ok(outcome) = executor.execute_task(task, &context).await {
                candidates.push((agent_id.to_string(), outcome.payload.to_string(), outcome.quality_score));
            }
        }
        candidates
    }

    async fn execute_swarm(
        &self,
        problem: &Problem,
        sub_problems: &[SubProblem],
        pool: &AgentPool,
        executors: &HashMap<AgentId, Arc<dyn AgentExecutor>>,
        now_ms: u64,
    ) -> Result<Solution, OrchestrationError> {
        let mut config = SwarmConfig::new(format!("{}-swarm", problem.title), SwarmBehavior::Democratic);
        config.max_agents = self.config.max_swarm_agents;
        config.voting_strategy = self.config.voter_config.strategy;
        let mut swarm = Swarm::new(config);

        let agent_ids = self.select_agents_for_problem(
            &problem.required_agent_types,
            self.config.max_swarm_agents,
            pool,
        );
        for id in &agent_ids {
            swarm.add_agent(id.clone());
        }

        let probe = CrewTask::new(problem.title.clone(), problem.description.clone());
        let candidates = Self::propose_candidates(&agent_ids, &probe, executors).await;

        let result = run_democratic_task(candidates, &self.config.voter_config, agent_ids.len());
        let _ = sub_problems;
        let _ = now_ms;

        Ok(Solution {
            problem_id: problem.id.clone(),
            approach: Approach::Swarm,
            payload: serde_json::json!({"winner": result.winner}),
            confidence: if result.passed { 0.8 } else { 0.5 },
            quality_score: result.winning_share,
            consensus_achieved: result.consensus,
            final_vote: Some(result),
            agents_engaged: agent_ids,
            swarms_used: 1,
            crews_used: 0,
            duration_ms: 0,
            iterations: swarm.iteration_history.len(),
            cancelled: false,
        })
    }

    async fn execute_crew(
        &self,
        problem: &Problem,
        sub_problems: &[SubProblem],
        pool: &mut AgentPool,
        executors: &HashMap<AgentId, Arc<dyn AgentExecutor>>,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
        cancellation: &CancellationFlag,
    ) -> Result<Solution, OrchestrationError> {
        let leader_id = self
            .select_best_agent(problem, pool)
            .ok_or(OrchestrationError::NoSuitableAgent)?;
        let specialists = self.select_agents_for_problem(&problem.required_agent_types, 4, pool);

        let mut crew = Crew::new(CrewConfig {
            process_mode: ProcessMode::Sequential,
            ..Default::default()
        });
        crew.add_member(leader_id.clone(), Role::Leader)?;
        for id in &specialists {
            if id != &leader_id {
                let _ = crew.add_member(id.clone(), Role::Specialist);
            }
        }

        for sub in sub_problems {
            crew.add_task(CrewTask::new(sub.title.clone(), sub.description.clone()));
        }

        let mut agents_engaged: Vec<AgentId> = vec![leader_id];
        agents_engaged.extend(specialists);

        let mut scheduler =
            CrewScheduler::new(&mut crew, pool, executors).with_cancellation(cancellation.clone());
        let summary = scheduler.run(metrics, now_ms).await?;

        let quality_score = if summary.completed.is_empty() {
            0.0
        } else {
            1.0 - (summary.failed.len() as f64 / (summary.completed.len() + summary.failed.len()) as f64)
        };

        Ok(Solution {
            problem_id: problem.id.clone(),
            approach: Approach::Crew,
            payload: serde_json::json!({
                "completed": summary.completed.len(),
                "failed": summary.failed.len(),
            }),
            confidence: 0.75,
            quality_score,
            final_vote: None,
            consensus_achieved: summary.failed.is_empty(),
            agents_engaged,
            swarms_used: 0,
            crews_used: 1,
            duration_ms: 0,
            iterations: 0,
            cancelled: summary.cancelled,
        })
    }

    async fn execute_multi_swarm(
        &self,
        problem: &Problem,
        sub_problems: &[SubProblem],
        pool: &AgentPool,
        executors: &HashMap<AgentId, Arc<dyn AgentExecutor>>,
        now_ms: u64,
    ) -> Result<Solution, OrchestrationError> {
        let mut per_swarm_votes = Vec::new();
        let mut agents_engaged = Vec::new();

        for sub in sub_problems {
            let agent_ids = self.select_agents_for_problem(&sub.required_agent_types, 4, pool).into_iter().take(4).collect::<Vec<_>>();
            let agent_ids = if agent_ids.len() < 2 {
                self.select_agents_for_problem(&[], 2, pool)
            } else {
                agent_ids
            };
            agents_engaged.extend(agent_ids.clone());

            let probe = CrewTask::new(sub.title.clone(), sub.description.clone());
            let candidates = Self::propose_candidates(&agent_ids, &probe, executors).await;

            let result = run_democratic_task(candidates, &self.config.voter_config, agent_ids.len());
            per_swarm_votes.push(Vote::single(sub.id.to_string(), result.winner.clone().unwrap_or_default())
                .with_confidence(result.winning_share));
        }

        let total = per_swarm_votes.len().max(1);
        let final_result = aggregate(per_swarm_votes, &self.config.voter_config, total);
        let _ = now_ms;
        let _ = problem;

        Ok(Solution {
            problem_id: problem.id.clone(),
            approach: Approach::MultiSwarm,
            payload: serde_json::json!({"winner": final_result.winner}),
            confidence: if final_result.passed { 0.8 } else { 0.55 },
            quality_score: final_result.winning_share,
            consensus_achieved: final_result.consensus,
            swarms_used: sub_problems.len(),
            crews_used: 0,
            duration_ms: 0,
            iterations: 0,
            cancelled: false,
            agents_engaged,
            final_vote: Some(final_result),
        })
    }

    async fn execute_hybrid(
        &self,
        problem: &Problem,
        sub_problems: &[SubProblem],
        pool: &mut AgentPool,
        executors: &HashMap<AgentId, Arc<dyn AgentExecutor>>,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
        cancellation: &CancellationFlag,
    ) -> Result<Solution, OrchestrationError> {
        let mut per_sub_votes = Vec::new();
        let mut agents_engaged = Vec::new();
        let mut swarms_used = 0;
        let mut crews_used = 0;
        let mut cancelled = false;

        for sub in sub_problems {
            if cancellation.is_cancelled() {
                cancelled = true;
                break;
            }
            if sub.required_agent_types.len() > 2 {
                let mut crew = Crew::new(CrewConfig::default());
                let members = self.select_agents_for_problem(&sub.required_agent_types, 3, pool);
                for (i, id) in members.iter().enumerate() {
                    let role = if i == 0 { Role::Leader } else { Role::Specialist };
                    let _ = crew.add_member(id.clone(), role);
                }
                crew.add_task(CrewTask::new(sub.title.clone(), sub.description.clone()));
                agents_engaged.extend(members);

                let mut scheduler =
                    CrewScheduler::new(&mut crew, pool, executors).with_cancellation(cancellation.clone());
                let summary = scheduler.run(metrics, now_ms).await?;
                crews_used += 1;
                if summary.cancelled {
                    cancelled = true;
                }

                let confidence = if summary.failed.is_empty() { 0.85 } else { 0.4 };
                per_sub_votes.push(
                    Vote::single(sub.id.to_string(), sub.id.to_string()).with_confidence(confidence),
                );
            } else {
                let agent_ids = self.select_agents_for_problem(&sub.required_agent_types, 4, pool);
                agents_engaged.extend(agent_ids.clone());
                let probe = CrewTask::new(sub.title.clone(), sub.description.clone());
                let candidates = Self::propose_candidates(&agent_ids, &probe, executors).await;
                let result = run_democratic_task(candidates, &self.config.voter_config, agent_ids.len());
                swarms_used += 1;
                per_sub_votes.push(
                    Vote::single(sub.id.to_string(), result.winner.clone().unwrap_or_default())
                        .with_confidence(result.winning_share),
                );
            }
        }

        let total = per_sub_votes.len().max(1);
        let final_result = aggregate(per_sub_votes, &self.config.voter_config, total);

        Ok(Solution {
            problem_id: problem.id.clone(),
            approach: Approach::Hybrid,
            payload: serde_json::json!({"winner": final_result.winner}),
            confidence: if final_result.passed { 0.82 } else { 0.5 },
            quality_score: final_result.winning_share,
            consensus_achieved: final_result.consensus,
            swarms_used,
            crews_used,
            duration_ms: 0,
            iterations: 0,
            cancelled,
            agents_engaged,
            final_vote: Some(final_result),
        })
    }

    /// Consensus phase (§4.F step 5): a single-round refinement re-voting
    /// the already-computed payload description among the agents engaged,
    /// bounded at a confidence ceiling of 0.95.
    fn run_consensus_phase(&self, solution: &mut Solution) -> Result<(), OrchestrationError> {
        if solution.agents_engaged.is_empty() {
            return Ok(());
        }
        let mut builder = ConsensusBuilder::new();
        let proposal = Proposal::new(
            "solver",
            solution.problem_id.to_string(),
            "refine the assembled solution",
            "solution-review",
        );
        let proposal_id = builder.submit(proposal);

        let agents = solution.agents_engaged.clone();
        let quality = solution.quality_score;
        let outcome = builder.refine_until_converged(
            &proposal_id,
            &self.config.consensus,
            &self.config.voter_config,
            agents.len(),
            move |_round| {
                agents
                    .iter()
                    .map(|id| {
                        Vote::single(id.to_string(), "accept").with_confidence(quality.max(0.5))
                    })
                    .collect()
            },
        )?;

        if outcome.converged {
            solution.confidence = (solution.confidence + 0.1).min(0.95);
            solution.consensus_achieved = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;

    fn problem_with(description_len: usize, required_types: Vec<AgentType>) -> Problem {
        Problem::new(
            "demo",
            "x".repeat(description_len),
            ProblemType::Development,
        )
        .with_required_agent_types(required_types)
    }

    #[test]
    fn worked_example_classification_matches_spec() {
        let problem = problem_with(100, vec![AgentType::Programming, AgentType::Devops, AgentType::Testing])
            .with_required_capabilities(vec!["x".into()]);
        assert_eq!(problem.classify_complexity(), Complexity::Complex);
        assert_eq!(
            select_approach(problem.classify_complexity(), problem.problem_type),
            Approach::Hybrid
        );
    }

    #[test]
    fn simple_problem_selects_single_agent() {
        let problem = problem_with(10, vec![]);
        assert_eq!(problem.classify_complexity(), Complexity::Simple);
        assert_eq!(
            select_approach(Complexity::Simple, ProblemType::General),
            Approach::SingleAgent
        );
    }

    #[test]
    fn decompose_uses_required_types_when_present() {
        let problem = problem_with(10, vec![AgentType::Programming, AgentType::Testing]);
        let subs = decompose(&problem);
        assert_eq!(subs.len(), 2);
        assert!(subs[0].title.contains("programming"));
    }

    #[test]
    fn decompose_falls_back_to_fixed_phases() {
        let problem = problem_with(10, vec![]);
        let subs = decompose(&problem);
        assert_eq!(subs.len(), 3);
        assert!(subs[0].title.contains("analysis"));
    }

    #[tokio::test]
    async fn single_agent_execution_fails_with_empty_pool() {
        let solver = ProblemSolver::default();
        let mut pool = AgentPool::new();
        let executors: HashMap<AgentId, Arc<dyn AgentExecutor>> = HashMap::new();
        let problem = problem_with(10, vec![]);

        let result = solver.select_best_agent(&problem, &mut pool);
        assert!(result.is_none());
        let _ = executors;
    }

    #[test]
    fn select_agents_for_problem_fills_quota_from_available() {
        let solver = ProblemSolver::default();
        let mut pool = AgentPool::new();
        for i in 0..3 {
            pool.register(Agent::new(format!("a{i}"), AgentType::General));
        }
        let ids = solver.select_agents_for_problem(&[], 2, &pool);
        assert_eq!(ids.len(), 2);
    }
}
