//! Solve Problem use case — the external entry point to the Problem Solver.

use maoc_domain::cancellation::CancellationFlag;
use maoc_domain::problem::{Problem, ProblemSolver, Solution, SolverConfig};
use thiserror::Error;
use tracing::info;

use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::shared::{now_ms, OrchestrationRuntime};

#[derive(Debug, Error)]
pub enum SolveProblemError {
    #[error("no agents registered")]
    EmptyPool,

    #[error(transparent)]
    Orchestration(#[from] maoc_domain::error::OrchestrationError),
}

/// Input for the `SolveProblem` use case.
#[derive(Debug, Clone)]
pub struct SolveProblemInput {
    pub problem: Problem,
    pub solver_config: SolverConfig,
}

impl SolveProblemInput {
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            solver_config: SolverConfig::default(),
        }
    }

    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }
}

/// Drives one `Solve(problem)` call against a shared [`OrchestrationRuntime`].
pub struct SolveProblemUseCase {
    runtime: OrchestrationRuntime,
}

impl SolveProblemUseCase {
    pub fn new(runtime: OrchestrationRuntime) -> Self {
        Self { runtime }
    }

    pub async fn execute(&self, input: SolveProblemInput) -> Result<Solution, SolveProblemError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: SolveProblemInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<Solution, SolveProblemError> {
        self.execute_with_cancellation(input, progress, &CancellationFlag::new()).await
    }

    /// As [`Self::execute_with_progress`], but the caller supplies the
    /// cancellation signal instead of one being created fresh — needed when
    /// the caller wants to cancel a solve already in flight (e.g. a CLI
    /// Ctrl-C handler).
    pub async fn execute_with_cancellation(
        &self,
        input: SolveProblemInput,
        progress: &dyn ProgressNotifier,
        cancellation: &CancellationFlag,
    ) -> Result<Solution, SolveProblemError> {
        if self.runtime.agent_count().await == 0 {
            return Err(SolveProblemError::EmptyPool);
        }

        info!(problem = %input.problem.title, "solving problem");
        let complexity = input.problem.classify_complexity();
        let approach = maoc_domain::problem::select_approach(complexity, input.problem.problem_type);
        progress.on_classified(complexity, approach);

        let solver = ProblemSolver::new(input.solver_config);
        let executors = self.runtime.executors_snapshot().await;
        let mut pool = self.runtime.pool().lock().await;
        let mut metrics = self.runtime.metrics().lock().await;

        let solution = solver
            .solve_with_cancellation(
                input.problem,
                &mut pool,
                &executors,
                &mut metrics,
                now_ms(),
                cancellation,
            )
            .await?;

        progress.on_solution(solution.confidence, solution.consensus_achieved);
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use maoc_domain::agent::{AgentDescriptor, AgentType};
    use maoc_domain::crew::Task;
    use maoc_domain::executor::{AgentExecutor, TaskContext, TaskOutcome};
    use maoc_domain::ids::AgentId;
    use maoc_domain::problem::ProblemType;
    use std::sync::Arc;

    struct StubExecutor;

    #[async_trait]
    impl AgentExecutor for StubExecutor {
        async fn execute_task(
            &self,
            _task: &Task,
            _context: &TaskContext,
        ) -> Result<TaskOutcome, maoc_domain::error::OrchestrationError> {
            Ok(TaskOutcome::success(serde_json::json!({"done": true}), 0.9))
        }

        fn descriptor(&self) -> AgentDescriptor {
            AgentDescriptor {
                id: AgentId::generate(),
                name: "stub".into(),
                agent_type: AgentType::General,
                capabilities: vec![],
                expertise_weight: 1.0,
            }
        }
    }

    #[tokio::test]
    async fn empty_pool_is_rejected() {
        let runtime = OrchestrationRuntime::new();
        let use_case = SolveProblemUseCase::new(runtime);
        let problem = Problem::new("p", "short", ProblemType::General);
        let result = use_case.execute(SolveProblemInput::new(problem)).await;
        assert!(matches!(result, Err(SolveProblemError::EmptyPool)));
    }

    #[tokio::test]
    async fn simple_problem_resolves_via_single_agent() {
        let runtime = OrchestrationRuntime::new();
        runtime
            .register_agent("a1", AgentType::General, Arc::new(StubExecutor))
            .await;

        let use_case = SolveProblemUseCase::new(runtime);
        let problem = Problem::new("p", "short", ProblemType::General);
        let solution = use_case
            .execute(SolveProblemInput::new(problem))
            .await
            .unwrap();

        assert_eq!(solution.approach, maoc_domain::problem::Approach::SingleAgent);
        assert!(solution.quality_score > 0.0);
    }
}
