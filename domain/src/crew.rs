//! Crew Scheduler (§4.E) — role-based task execution over a fixed group of
//! agents, with four process modes. This module owns the `Crew` entity
//! (members, tasks, lifecycle state) and the `CrewScheduler` that drives
//! tasks to completion against a registry of `AgentExecutor` callbacks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentType;
use crate::cancellation::CancellationFlag;
use crate::error::OrchestrationError;
use crate::executor::{AgentExecutor, TaskContext, TaskOutcome};
use crate::ids::{AgentId, CrewId, TaskId};
use crate::metrics::MetricsRegistry;
use crate::pool::AgentPool;
use crate::vote::{Vote, VoteResult, VoterConfig};

/// Role a crew member holds within the crew (§4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Leader,
    Manager,
    Specialist,
    Executor,
    Reviewer,
}

/// Lifecycle state of a single task within a crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

/// A unit of work a crew executes.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub required_agent_type: Option<AgentType>,
    pub assigned_agent: Option<AgentId>,
    pub assigned_role: Option<Role>,
    pub prerequisites: HashSet<TaskId>,
    pub status: TaskStatus,
    pub requires_vote: Option<crate::vote::VotingStrategy>,
    pub requires_review: bool,
    pub retry_budget: u32,
    pub attempts: u32,
    pub result: Option<TaskOutcome>,
    pub quality_score: Option<f64>,
    /// Set when the scheduler moves this task to `Skipped` without running
    /// it, e.g. `"cancelled"` or `"dependency-abort"`.
    pub skip_reason: Option<String>,
}

impl Task {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            title: title.into(),
            description: description.into(),
            priority: 0,
            required_agent_type: None,
            assigned_agent: None,
            assigned_role: None,
            prerequisites: HashSet::new(),
            status: TaskStatus::Pending,
            requires_vote: None,
            requires_review: false,
            retry_budget: 0,
            attempts: 0,
            result: None,
            quality_score: None,
            skip_reason: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_required_type(mut self, agent_type: AgentType) -> Self {
        self.required_agent_type = Some(agent_type);
        self
    }

    pub fn with_prerequisite(mut self, id: TaskId) -> Self {
        self.prerequisites.insert(id);
        self
    }

    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn requiring_review(mut self) -> Self {
        self.requires_review = true;
        self
    }

    pub fn requiring_vote(mut self, strategy: crate::vote::VotingStrategy) -> Self {
        self.requires_vote = Some(strategy);
        self
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }
}

/// Process mode a crew runs under (§4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessMode {
    Sequential,
    Parallel,
    Hierarchical,
    Democratic,
}

/// Static configuration for a crew (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrewConfig {
    #[serde(default = "default_crew_name")]
    pub name: String,
    pub process_mode: ProcessMode,
    #[serde(default = "default_governance_model")]
    pub governance_model: String,
    #[serde(default)]
    pub required_roles: HashMap<Role, usize>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_tasks: usize,
    #[serde(default)]
    pub allow_delegation: bool,
    #[serde(default)]
    pub require_review: bool,
    #[serde(default)]
    pub voting_enabled: bool,
    #[serde(default)]
    pub voter_config: Option<VoterConfig>,
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub allow_reassignment: bool,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_crew_name() -> String {
    "crew".to_string()
}

fn default_governance_model() -> String {
    "consensus".to_string()
}

fn default_quality_threshold() -> f64 {
    0.7
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            name: default_crew_name(),
            process_mode: ProcessMode::Sequential,
            governance_model: default_governance_model(),
            required_roles: HashMap::new(),
            max_concurrent_tasks: default_max_concurrent(),
            allow_delegation: false,
            require_review: false,
            voting_enabled: false,
            voter_config: None,
            quality_threshold: default_quality_threshold(),
            max_retries: 0,
            allow_reassignment: false,
        }
    }
}

/// Per-member bookkeeping tracked by the crew (folded in from the
/// original's separate agent-metrics record, §2 supplement).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CrewMemberStats {
    pub tasks_assigned: u32,
    pub tasks_completed: u32,
    pub quality_score: f64,
}

#[derive(Debug, Clone)]
pub struct CrewMember {
    pub agent_id: AgentId,
    pub role: Role,
    pub stats: CrewMemberStats,
}

/// Lifecycle state of the crew as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewState {
    Assembling,
    Ready,
    Working,
    Reviewing,
    Completed,
    Paused,
    Disbanded,
}

/// A fixed group of agents working a shared task list.
pub struct Crew {
    pub id: CrewId,
    pub config: CrewConfig,
    members: HashMap<AgentId, CrewMember>,
    tasks: HashMap<TaskId, Task>,
    task_order: Vec<TaskId>,
    pub state: CrewState,
}

impl Crew {
    pub fn new(config: CrewConfig) -> Self {
        Self {
            id: CrewId::generate(),
            config,
            members: HashMap::new(),
            tasks: HashMap::new(),
            task_order: Vec::new(),
            state: CrewState::Assembling,
        }
    }

    pub fn add_member(&mut self, agent_id: AgentId, role: Role) -> Result<(), OrchestrationError> {
        if self.members.contains_key(&agent_id) {
            return Err(OrchestrationError::MemberAlreadyPresent(agent_id.to_string()));
        }
        self.members.insert(
            agent_id.clone(),
            CrewMember {
                agent_id,
                role,
                stats: CrewMemberStats::default(),
            },
        );
        self.recompute_state();
        Ok(())
    }

    pub fn remove_member(&mut self, agent_id: &AgentId) -> Result<(), OrchestrationError> {
        if self.members.remove(agent_id).is_none() {
            return Err(OrchestrationError::MemberNotPresent(agent_id.to_string()));
        }
        self.recompute_state();
        Ok(())
    }

    pub fn members(&self) -> impl Iterator<Item = &CrewMember> {
        self.members.values()
    }

    pub fn members_with_role(&self, role: Role) -> impl Iterator<Item = &CrewMember> {
        self.members.values().filter(move |m| m.role == role)
    }

    pub fn member(&self, agent_id: &AgentId) -> Option<&CrewMember> {
        self.members.get(agent_id)
    }

    pub fn add_task(&mut self, task: Task) -> TaskId {
        let id = task.id.clone();
        self.tasks.insert(id.clone(), task);
        self.task_order.push(id.clone());
        id
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.task_order.iter().filter_map(|id| self.tasks.get(id))
    }

    pub fn is_ready(&self) -> bool {
        self.config.required_roles.iter().all(|(role, required)| {
            self.members.values().filter(|m| m.role == *role).count() >= *required
        })
    }

    /// Re-derive `state` from role quotas; never downgrades out of a
    /// terminal state once Working has begun.
    fn recompute_state(&mut self) {
        if matches!(self.state, CrewState::Assembling | CrewState::Ready) {
            self.state = if self.is_ready() {
                CrewState::Ready
            } else {
                CrewState::Assembling
            };
        }
    }

    /// Tasks with every prerequisite completed and not yet terminal.
    fn ready_tasks(&self) -> Vec<TaskId> {
        self.task_order
            .iter()
            .filter(|id| {
                let task = &self.tasks[*id];
                !task.is_terminal()
                    && task.status != TaskStatus::Running
                    && task.prerequisites.iter().all(|p| {
                        self.tasks
                            .get(p)
                            .map(|t| t.status == TaskStatus::Completed)
                            .unwrap_or(false)
                    })
            })
            .cloned()
            .collect()
    }

    /// Group outstanding tasks into dependency levels for parallel dispatch.
    /// Returns `CircularDependency` if a cycle prevents full resolution.
    fn dependency_levels(&self) -> Result<Vec<Vec<TaskId>>, OrchestrationError> {
        let mut remaining: HashSet<TaskId> = self
            .task_order
            .iter()
            .filter(|id| !self.tasks[*id].is_terminal())
            .cloned()
            .collect();
        let mut completed: HashSet<TaskId> = self
            .task_order
            .iter()
            .filter(|id| self.tasks[*id].status == TaskStatus::Completed)
            .cloned()
            .collect();
        let mut levels = Vec::new();

        while !remaining.is_empty() {
            let ready: Vec<TaskId> = remaining
                .iter()
                .filter(|id| {
                    self.tasks[*id]
                        .prerequisites
                        .iter()
                        .all(|p| completed.contains(p) || !remaining.contains(p) && !self.tasks.contains_key(p))
                })
                .cloned()
                .collect();

            if ready.is_empty() {
                let stuck: Vec<String> = remaining.iter().map(|id| id.to_string()).collect();
                return Err(OrchestrationError::CircularDependency(stuck));
            }

            for id in &ready {
                remaining.remove(id);
                completed.insert(id.clone());
            }
            levels.push(ready);
        }

        Ok(levels)
    }
}

/// A pluggable task-assignment strategy; the default picks the first
/// available member whose role and agent type satisfy the task.
pub trait AssignmentStrategy {
    fn assign<'a>(&self, task: &Task, crew: &'a Crew, pool: &AgentPool) -> Option<AgentId>;
}

/// Assign to the least-loaded eligible member (by tasks_assigned), breaking
/// ties on agent id for determinism.
pub struct LeastLoadedAssignment;

impl AssignmentStrategy for LeastLoadedAssignment {
    fn assign(&self, task: &Task, crew: &Crew, pool: &AgentPool) -> Option<AgentId> {
        let mut candidates: Vec<&CrewMember> = crew
            .members()
            .filter(|m| {
                pool.lookup(&m.agent_id)
                    .map(|agent| {
                        agent.is_available()
                            && task
                                .required_agent_type
                                .is_none_or(|required| agent.agent_type == required)
                    })
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.stats
                .tasks_assigned
                .cmp(&b.stats.tasks_assigned)
                .then_with(|| a.agent_id.as_str().cmp(b.agent_id.as_str()))
        });
        candidates.first().map(|m| m.agent_id.clone())
    }
}

/// Drives a `Crew`'s tasks to completion using a registry of executor
/// callbacks, one per agent. Holds the pool by reference so reservations are
/// visible to every other consumer of the same pool.
pub struct CrewScheduler<'a> {
    pub crew: &'a mut Crew,
    pub pool: &'a mut AgentPool,
    executors: &'a HashMap<AgentId, Arc<dyn AgentExecutor>>,
    assignment: Box<dyn AssignmentStrategy + 'a>,
    cancellation: Option<CancellationFlag>,
}

/// Outcome of a full crew run.
#[derive(Debug, Clone, Default)]
pub struct CrewRunSummary {
    pub completed: Vec<TaskId>,
    pub failed: Vec<TaskId>,
    pub skipped: Vec<TaskId>,
    pub votes: Vec<(TaskId, VoteResult)>,
    /// Set when the run ended early because of a cancellation signal rather
    /// than running every task to a terminal state.
    pub cancelled: bool,
}

impl<'a> CrewScheduler<'a> {
    pub fn new(
        crew: &'a mut Crew,
        pool: &'a mut AgentPool,
        executors: &'a HashMap<AgentId, Arc<dyn AgentExecutor>>,
    ) -> Self {
        Self {
            crew,
            pool,
            executors,
            assignment: Box::new(LeastLoadedAssignment),
            cancellation: None,
        }
    }

    pub fn with_assignment_strategy(mut self, strategy: impl AssignmentStrategy + 'a) -> Self {
        self.assignment = Box::new(strategy);
        self
    }

    /// Attach a cooperative cancellation signal. Checked between tasks in
    /// sequential/hierarchical/democratic modes and between dependency
    /// levels in parallel mode (§5).
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(|f| f.is_cancelled())
    }

    /// Run the crew to completion (or a stuck state) under its configured
    /// process mode, logging each transition into `metrics`.
    pub async fn run(
        &mut self,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
    ) -> Result<CrewRunSummary, OrchestrationError> {
        self.crew.state = CrewState::Working;
        metrics
            .events
            .append(self.crew.id.to_string(), "working", Value::Null, now_ms);

        let summary = match self.crew.config.process_mode {
            ProcessMode::Sequential => self.run_sequential(metrics, now_ms).await?,
            ProcessMode::Parallel => self.run_parallel(metrics, now_ms).await?,
            ProcessMode::Hierarchical => self.run_hierarchical(metrics, now_ms).await?,
            ProcessMode::Democratic => self.run_democratic(metrics, now_ms).await?,
        };

        self.crew.state = if summary.cancelled {
            CrewState::Paused
        } else if summary.failed.is_empty() {
            CrewState::Completed
        } else {
            CrewState::Paused
        };
        metrics.events.append(
            self.crew.id.to_string(),
            "run_finished",
            serde_json::json!({
                "completed": summary.completed.len(),
                "failed": summary.failed.len(),
            }),
            now_ms,
        );
        Ok(summary)
    }

    async fn run_sequential(
        &mut self,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
    ) -> Result<CrewRunSummary, OrchestrationError> {
        let mut summary = CrewRunSummary::default();
        loop {
            if self.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let ready = self.crew.ready_tasks();
            let Some(task_id) = ready.into_iter().next() else {
                break;
            };
            self.execute_one(&task_id, metrics, now_ms, &mut summary)
                .await;
        }
        self.collect_skipped(&mut summary);
        Ok(summary)
    }

    async fn run_parallel(
        &mut self,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
    ) -> Result<CrewRunSummary, OrchestrationError> {
        let mut summary = CrewRunSummary::default();
        let levels = self.crew.dependency_levels()?;

        for level in levels {
            if self.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            self.dispatch_concurrent(&level, metrics, now_ms, &mut summary)
                .await;
        }

        self.collect_skipped(&mut summary);
        Ok(summary)
    }

    /// Run a batch of ready tasks to completion concurrently, in chunks of
    /// `max_concurrent_tasks` so no task within the batch is ever stranded —
    /// overflow beyond one chunk runs in the next chunk rather than being
    /// dropped.
    async fn dispatch_concurrent(
        &mut self,
        task_ids: &[TaskId],
        metrics: &mut MetricsRegistry,
        now_ms: u64,
        summary: &mut CrewRunSummary,
    ) {
        let cap = self.crew.config.max_concurrent_tasks.max(1);
        for chunk in task_ids.chunks(cap) {
            let mut assignments = Vec::new();
            for task_id in chunk {
                if let Some(agent_id) = self.assign_task(task_id) {
                    if let Ok(reservation) = self.pool.reserve(&agent_id, self.crew.id.to_string()) {
                        assignments.push((task_id.clone(), agent_id, reservation));
                    }
                }
            }

            let futures = assignments.iter().map(|(task_id, agent_id, _)| {
                let task = self.crew.tasks[task_id].clone();
                let executor = self.executors.get(agent_id).cloned();
                let context = TaskContext::new();
                async move {
                    match executor {
                        Some(exec) => exec.execute_task(&task, &context).await,
                        None => Err(OrchestrationError::NoSuitableAgent),
                    }
                }
            });
            let results = futures::future::join_all(futures).await;

            for ((task_id, agent_id, reservation), result) in assignments.into_iter().zip(results) {
                self.pool.release(&reservation);
                self.apply_result(&task_id, &agent_id, result, metrics, now_ms, summary);
            }
        }
    }

    async fn run_hierarchical(
        &mut self,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
    ) -> Result<CrewRunSummary, OrchestrationError> {
        let has_manager = self.crew.members_with_role(Role::Manager).count() > 0;
        if !has_manager {
            metrics.events.append(
                self.crew.id.to_string(),
                "hierarchical_fallback_warning",
                serde_json::json!({"reason": "no manager member; falling back to sequential"}),
                now_ms,
            );
            return self.run_sequential(metrics, now_ms).await;
        }

        let mut summary = CrewRunSummary::default();
        let levels = self.crew.dependency_levels()?;

        for level in levels {
            if self.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            for task_id in &level {
                let (needs_assignment, required_type) = match self.crew.tasks.get(task_id) {
                    Some(task) => (task.assigned_agent.is_none(), task.required_agent_type),
                    None => (false, None),
                };
                if !needs_assignment {
                    continue;
                }
                if let Some(agent_id) = self.manager_assign(required_type) {
                    if let Some(task) = self.crew.tasks.get_mut(task_id) {
                        task.assigned_agent = Some(agent_id);
                    }
                }
            }

            self.dispatch_concurrent(&level, metrics, now_ms, &mut summary)
                .await;
        }

        self.collect_skipped(&mut summary);
        Ok(summary)
    }

    /// The manager's delegation rule (§4.E): the first available specialist,
    /// falling back to the first available executor. Never the manager
    /// itself — the manager only assigns, it does not execute.
    fn manager_assign(&self, required_agent_type: Option<AgentType>) -> Option<AgentId> {
        let pick_from = |role: Role| {
            let mut candidates: Vec<&CrewMember> = self
                .crew
                .members_with_role(role)
                .filter(|m| {
                    self.pool
                        .lookup(&m.agent_id)
                        .map(|agent| {
                            agent.is_available()
                                && required_agent_type.is_none_or(|required| agent.agent_type == required)
                        })
                        .unwrap_or(false)
                })
                .collect();
            candidates.sort_by(|a, b| a.agent_id.as_str().cmp(b.agent_id.as_str()));
            candidates.first().map(|m| m.agent_id.clone())
        };
        pick_from(Role::Specialist).or_else(|| pick_from(Role::Executor))
    }

    async fn run_democratic(
        &mut self,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
    ) -> Result<CrewRunSummary, OrchestrationError> {
        let mut summary = CrewRunSummary::default();

        loop {
            if self.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let ready = self.crew.ready_tasks();
            let Some(task_id) = ready.into_iter().next() else {
                break;
            };

            let strategy = self.crew.tasks.get(&task_id).and_then(|t| t.requires_vote);
            if let Some(strategy) = strategy {
                let result = self.vote_on_task(strategy);
                metrics.crew(self.crew.id.clone()).record_vote(result.consensus);

                if result.winner.as_deref() != Some("approve") {
                    if let Some(task) = self.crew.tasks.get_mut(&task_id) {
                        task.status = TaskStatus::Skipped;
                        task.skip_reason = Some("vote_rejected".to_string());
                    }
                    metrics.events.append(
                        self.crew.id.to_string(),
                        "task_skipped",
                        serde_json::json!({"task_id": task_id.to_string(), "reason": "vote_rejected"}),
                        now_ms,
                    );
                    summary.skipped.push(task_id.clone());
                    summary.votes.push((task_id, result));
                    continue;
                }
                summary.votes.push((task_id.clone(), result));
            }

            self.execute_one(&task_id, metrics, now_ms, &mut summary)
                .await;
        }

        self.collect_skipped(&mut summary);
        Ok(summary)
    }

    /// Opens a real `VotingSession` over every crew member before a vote-gated
    /// task runs (§4.A/§4.E): each member's ballot reflects its own current
    /// pool availability and expertise weight, never the task's own
    /// not-yet-produced result.
    fn vote_on_task(&mut self, strategy: crate::vote::VotingStrategy) -> VoteResult {
        let voter_config = VoterConfig {
            strategy,
            ..self.crew.config.voter_config.clone().unwrap_or_default()
        };
        let eligible: HashSet<String> = self
            .crew
            .members()
            .map(|m| m.agent_id.to_string())
            .collect();
        let mut session = crate::vote::VotingSession::open(
            crate::ids::ProposalId::generate(),
            strategy,
            voter_config.threshold,
            eligible,
        );

        for member in self.crew.members() {
            let (approves, weight) = self
                .pool
                .lookup(&member.agent_id)
                .map(|agent| (agent.is_available(), agent.expertise_weight()))
                .unwrap_or((false, 1.0));
            let _ = session.cast_vote(
                Vote::single(
                    member.agent_id.to_string(),
                    if approves { "approve" } else { "reject" },
                )
                .with_weight(weight),
            );
        }

        let total_agents = self.crew.members().count();
        session.complete(&voter_config, total_agents).clone()
    }

    fn assign_task(&mut self, task_id: &TaskId) -> Option<AgentId> {
        let task = self.crew.tasks.get(task_id)?.clone();
        if let Some(existing) = &task.assigned_agent {
            return Some(existing.clone());
        }
        let agent_id = self.assignment.assign(&task, self.crew, self.pool)?;
        if let Some(task) = self.crew.tasks.get_mut(task_id) {
            task.assigned_agent = Some(agent_id.clone());
        }
        Some(agent_id)
    }

    async fn execute_one(
        &mut self,
        task_id: &TaskId,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
        summary: &mut CrewRunSummary,
    ) {
        let Some(agent_id) = self.assign_task(task_id) else {
            if let Some(task) = self.crew.tasks.get_mut(task_id) {
                task.status = TaskStatus::Failed;
            }
            summary.failed.push(task_id.clone());
            return;
        };

        let reservation = match self.pool.reserve(&agent_id, self.crew.id.to_string()) {
            Ok(r) => r,
            Err(_) => {
                if let Some(task) = self.crew.tasks.get_mut(task_id) {
                    task.status = TaskStatus::Failed;
                }
                summary.failed.push(task_id.clone());
                return;
            }
        };

        if let Some(task) = self.crew.tasks.get_mut(task_id) {
            task.status = TaskStatus::Running;
            task.attempts += 1;
        }

        let task = self.crew.tasks[task_id].clone();
        let context = TaskContext::new();
        let result = match self.executors.get(&agent_id) {
            Some(executor) => executor.execute_task(&task, &context).await,
            None => Err(OrchestrationError::NoSuitableAgent),
        };

        self.pool.release(&reservation);
        self.apply_result(task_id, &agent_id, result, metrics, now_ms, summary);
    }

    fn apply_result(
        &mut self,
        task_id: &TaskId,
        agent_id: &AgentId,
        result: Result<TaskOutcome, OrchestrationError>,
        metrics: &mut MetricsRegistry,
        now_ms: u64,
        summary: &mut CrewRunSummary,
    ) {
        let retry_budget = self
            .crew
            .tasks
            .get(task_id)
            .map(|t| t.retry_budget)
            .unwrap_or(0);
        let attempts = self.crew.tasks.get(task_id).map(|t| t.attempts).unwrap_or(0);

        match result {
            Ok(outcome) if outcome.success => {
                if let Some(task) = self.crew.tasks.get_mut(task_id) {
                    task.quality_score = Some(outcome.quality_score);
                    task.status = TaskStatus::Completed;
                    task.result = Some(outcome.clone());
                }
                if let Some(member) = self.crew.members.get_mut(agent_id) {
                    member.stats.tasks_assigned += 1;
                    member.stats.tasks_completed += 1;
                    member.stats.quality_score = outcome.quality_score;
                }
                metrics
                    .crew(self.crew.id.clone())
                    .record_task(true, 0.0);
                metrics.events.append(
                    self.crew.id.to_string(),
                    "task_completed",
                    serde_json::json!({"task_id": task_id.to_string()}),
                    now_ms,
                );

                let approved = self.apply_review(task_id, metrics, now_ms);
                if approved {
                    summary.completed.push(task_id.clone());
                } else {
                    summary.failed.push(task_id.clone());
                }
            }
            Ok(_) | Err(_) => {
                if attempts <= retry_budget {
                    if let Some(task) = self.crew.tasks.get_mut(task_id) {
                        task.status = TaskStatus::Pending;
                    }
                    return;
                }
                if let Some(task) = self.crew.tasks.get_mut(task_id) {
                    task.status = TaskStatus::Failed;
                }
                if let Some(member) = self.crew.members.get_mut(agent_id) {
                    member.stats.tasks_assigned += 1;
                }
                metrics
                    .crew(self.crew.id.clone())
                    .record_task(false, 0.0);
                metrics.events.append(
                    self.crew.id.to_string(),
                    "task_failed",
                    serde_json::json!({"task_id": task_id.to_string()}),
                    now_ms,
                );
                summary.failed.push(task_id.clone());
            }
        }
    }

    /// Review gate (§4.E): if the crew requires review and the task asked
    /// for one, a `Reviewer` member judges quality against the crew's
    /// threshold; absent a reviewer, auto-approve and record that. Returns
    /// whether the task remains `Completed` (rejection flips it to `Failed`).
    fn apply_review(&mut self, task_id: &TaskId, metrics: &mut MetricsRegistry, now_ms: u64) -> bool {
        let Some(task) = self.crew.tasks.get(task_id) else {
            return true;
        };
        if !(self.crew.config.require_review && task.requires_review) {
            return true;
        }

        let quality = task.quality_score.unwrap_or(0.0);
        let reviewer = self
            .crew
            .members_with_role(Role::Reviewer)
            .next()
            .map(|m| m.agent_id.clone());
        let approved = quality >= self.crew.config.quality_threshold;

        metrics.events.append(
            self.crew.id.to_string(),
            if reviewer.is_some() { "task_reviewed" } else { "task_auto_approved" },
            serde_json::json!({
                "task_id": task_id.to_string(),
                "reviewer": reviewer.as_ref().map(|r| r.to_string()),
                "approved": approved,
            }),
            now_ms,
        );

        if !approved && let Some(task) = self.crew.tasks.get_mut(task_id) {
            task.status = TaskStatus::Failed;
        }
        approved
    }

    fn collect_skipped(&mut self, summary: &mut CrewRunSummary) {
        let reason = if summary.cancelled { "cancelled" } else { "unreachable" };
        for id in &self.crew.task_order {
            let task = &self.crew.tasks[id];
            if !task.is_terminal() {
                summary.skipped.push(id.clone());
            }
        }
        for id in &summary.skipped {
            if let Some(task) = self.crew.tasks.get_mut(id) {
                task.status = TaskStatus::Skipped;
                task.skip_reason = Some(reason.to_string());
            }
        }
    }
}

/// Review step: a `Reviewer` member re-scores a completed task's output.
/// Replaces the task's quality score only if the review ran; never fabricates
/// a score the reviewer callback didn't produce.
pub async fn review_task(
    task: &Task,
    reviewer: &Arc<dyn AgentExecutor>,
    context: &TaskContext,
) -> Result<TaskOutcome, OrchestrationError> {
    reviewer.execute_task(task, context).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentType};
    use serde_json::json;

    struct AlwaysSucceeds;

    #[async_trait]
    impl AgentExecutor for AlwaysSucceeds {
        async fn execute_task(
            &self,
            _task: &Task,
            _context: &TaskContext,
        ) -> Result<TaskOutcome, OrchestrationError> {
            Ok(TaskOutcome::success(json!({"ok": true}), 0.9))
        }

        fn descriptor(&self) -> crate::agent::AgentDescriptor {
            crate::agent::AgentDescriptor {
                id: AgentId::generate(),
                name: "stub".into(),
                agent_type: AgentType::General,
                capabilities: vec![],
                expertise_weight: 1.0,
            }
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl AgentExecutor for AlwaysFails {
        async fn execute_task(
            &self,
            _task: &Task,
            _context: &TaskContext,
        ) -> Result<TaskOutcome, OrchestrationError> {
            Ok(TaskOutcome::failure(json!({"error": "boom"})))
        }

        fn descriptor(&self) -> crate::agent::AgentDescriptor {
            crate::agent::AgentDescriptor {
                id: AgentId::generate(),
                name: "stub-fail".into(),
                agent_type: AgentType::General,
                capabilities: vec![],
                expertise_weight: 1.0,
            }
        }
    }

    fn setup_single_agent_crew(
        process_mode: ProcessMode,
        succeed: bool,
    ) -> (Crew, AgentPool, HashMap<AgentId, Arc<dyn AgentExecutor>>) {
        let mut pool = AgentPool::new();
        let agent_id = pool.register(Agent::new("a1", AgentType::General));

        let mut crew = Crew::new(CrewConfig {
            process_mode,
            ..Default::default()
        });
        crew.add_member(agent_id.clone(), Role::Executor).unwrap();

        let mut executors: HashMap<AgentId, Arc<dyn AgentExecutor>> = HashMap::new();
        let executor: Arc<dyn AgentExecutor> = if succeed {
            Arc::new(AlwaysSucceeds)
        } else {
            Arc::new(AlwaysFails)
        };
        executors.insert(agent_id, executor);

        (crew, pool, executors)
    }

    #[tokio::test]
    async fn sequential_runs_tasks_in_order() {
        let (mut crew, mut pool, executors) =
            setup_single_agent_crew(ProcessMode::Sequential, true);
        crew.add_task(Task::new("first", "d"));
        crew.add_task(Task::new("second", "d"));

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();

        assert_eq!(summary.completed.len(), 2);
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn failed_task_without_retry_budget_is_marked_failed() {
        let (mut crew, mut pool, executors) =
            setup_single_agent_crew(ProcessMode::Sequential, false);
        crew.add_task(Task::new("t", "d"));

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();

        assert_eq!(summary.failed.len(), 1);
        assert!(summary.completed.is_empty());
    }

    #[tokio::test]
    async fn parallel_mode_resolves_independent_tasks_in_one_level() {
        let (mut crew, mut pool, executors) =
            setup_single_agent_crew(ProcessMode::Parallel, true);
        let a = crew.add_task(Task::new("a", "d"));
        let _b = crew.add_task(Task::new("b", "d").with_prerequisite(a));

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let levels = scheduler.crew.dependency_levels().unwrap();
        assert_eq!(levels.len(), 2);

        let summary = scheduler.run(&mut metrics, 0).await.unwrap();
        assert_eq!(summary.completed.len(), 2);
    }

    #[test]
    fn circular_dependency_is_detected() {
        let (mut crew, _pool, _executors) = setup_single_agent_crew(ProcessMode::Parallel, true);
        let t1 = Task::new("a", "d");
        let t1_id = t1.id.clone();
        let t2 = Task::new("b", "d").with_prerequisite(t1_id.clone());
        let t2_id = t2.id.clone();
        crew.add_task(t1.with_prerequisite(t2_id.clone()));
        crew.add_task(t2);

        let result = crew.dependency_levels();
        assert!(matches!(result, Err(OrchestrationError::CircularDependency(_))));
        let _ = t1_id;
    }

    #[tokio::test]
    async fn hierarchical_falls_back_to_sequential_without_manager() {
        let (mut crew, mut pool, executors) =
            setup_single_agent_crew(ProcessMode::Hierarchical, true);
        crew.add_task(Task::new("t", "d"));

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();
        assert_eq!(summary.completed.len(), 1);
        assert!(
            metrics
                .events
                .by_component(&crew.id.to_string())
                .any(|e| e.event_type == "hierarchical_fallback_warning")
        );
    }

    #[tokio::test]
    async fn hierarchical_manager_delegates_to_specialist_not_itself() {
        let mut pool = AgentPool::new();
        let manager_id = pool.register(Agent::new("manager", AgentType::General));
        let specialist_id = pool.register(Agent::new("specialist", AgentType::General));

        let mut crew = Crew::new(CrewConfig {
            process_mode: ProcessMode::Hierarchical,
            ..Default::default()
        });
        crew.add_member(manager_id.clone(), Role::Manager).unwrap();
        crew.add_member(specialist_id.clone(), Role::Specialist)
            .unwrap();
        let task_id = crew.add_task(Task::new("t", "d"));

        let mut executors: HashMap<AgentId, Arc<dyn AgentExecutor>> = HashMap::new();
        executors.insert(manager_id.clone(), Arc::new(AlwaysSucceeds));
        executors.insert(specialist_id.clone(), Arc::new(AlwaysSucceeds));

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();

        assert_eq!(summary.completed, vec![task_id.clone()]);
        assert_eq!(crew.task(&task_id).unwrap().assigned_agent, Some(specialist_id));
    }

    #[tokio::test]
    async fn parallel_cap_does_not_strand_overflow_tasks_in_level() {
        let mut pool = AgentPool::new();
        let mut executors: HashMap<AgentId, Arc<dyn AgentExecutor>> = HashMap::new();
        let mut crew = Crew::new(CrewConfig {
            process_mode: ProcessMode::Parallel,
            max_concurrent_tasks: 1,
            ..Default::default()
        });
        let mut task_ids = Vec::new();
        for i in 0..3 {
            let agent_id = pool.register(Agent::new(format!("a{i}"), AgentType::General));
            crew.add_member(agent_id.clone(), Role::Executor).unwrap();
            executors.insert(agent_id, Arc::new(AlwaysSucceeds));
            task_ids.push(crew.add_task(Task::new(format!("t{i}"), "d")));
        }

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();

        assert_eq!(summary.completed.len(), 3);
        assert!(summary.skipped.is_empty());
    }

    #[tokio::test]
    async fn democratic_mode_votes_before_executing_a_vote_gated_task() {
        let (mut crew, mut pool, executors) =
            setup_single_agent_crew(ProcessMode::Democratic, true);
        crew.add_task(Task::new("t", "d").requiring_vote(crate::vote::VotingStrategy::Majority));

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();

        assert_eq!(summary.votes.len(), 1);
        assert_eq!(summary.completed.len(), 1);
    }

    #[tokio::test]
    async fn democratic_mode_skips_task_on_vote_rejection_without_running_it() {
        let mut pool = AgentPool::new();
        let a1 = pool.register(Agent::new("a1", AgentType::General));
        let a2 = pool.register(Agent::new("a2", AgentType::General));
        pool.mark_failed(&a2);

        let mut crew = Crew::new(CrewConfig {
            process_mode: ProcessMode::Democratic,
            ..Default::default()
        });
        crew.add_member(a1.clone(), Role::Executor).unwrap();
        crew.add_member(a2.clone(), Role::Executor).unwrap();
        let task_id = crew
            .add_task(Task::new("t", "d").requiring_vote(crate::vote::VotingStrategy::Majority));

        let mut executors: HashMap<AgentId, Arc<dyn AgentExecutor>> = HashMap::new();
        executors.insert(a1, Arc::new(AlwaysSucceeds));
        executors.insert(a2, Arc::new(AlwaysSucceeds));

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();

        assert!(summary.completed.is_empty());
        assert_eq!(summary.skipped, vec![task_id.clone()]);
        assert_eq!(
            crew.task(&task_id).unwrap().status,
            TaskStatus::Skipped
        );
        assert_eq!(
            crew.task(&task_id).unwrap().skip_reason.as_deref(),
            Some("vote_rejected")
        );
    }

    #[test]
    fn add_member_twice_errors() {
        let (mut crew, _pool, _executors) = setup_single_agent_crew(ProcessMode::Sequential, true);
        let existing = crew.members().next().unwrap().agent_id.clone();
        assert!(matches!(
            crew.add_member(existing, Role::Reviewer),
            Err(OrchestrationError::MemberAlreadyPresent(_))
        ));
    }

    #[test]
    fn is_ready_respects_role_quota() {
        let mut pool = AgentPool::new();
        let a1 = pool.register(Agent::new("a1", AgentType::General));
        let mut config = CrewConfig::default();
        config.required_roles.insert(Role::Reviewer, 1);
        let mut crew = Crew::new(config);
        assert!(!crew.is_ready());
        crew.add_member(a1, Role::Reviewer).unwrap();
        assert!(crew.is_ready());
    }

    #[tokio::test]
    async fn cancellation_skips_remaining_tasks_with_reason() {
        let (mut crew, mut pool, executors) =
            setup_single_agent_crew(ProcessMode::Sequential, true);
        crew.add_task(Task::new("t1", "d"));
        crew.add_task(Task::new("t2", "d"));

        let flag = CancellationFlag::new();
        flag.cancel();
        let mut metrics = MetricsRegistry::new();
        let mut scheduler =
            CrewScheduler::new(&mut crew, &mut pool, &executors).with_cancellation(flag);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.skipped.len(), 2);
        for id in &summary.skipped {
            assert_eq!(
                crew.task(id).unwrap().skip_reason.as_deref(),
                Some("cancelled")
            );
        }
    }

    #[tokio::test]
    async fn review_rejects_below_quality_threshold_without_reviewer() {
        let mut pool = AgentPool::new();
        let agent_id = pool.register(Agent::new("a1", AgentType::General));

        struct LowQuality;
        #[async_trait]
        impl AgentExecutor for LowQuality {
            async fn execute_task(
                &self,
                _task: &Task,
                _context: &TaskContext,
            ) -> Result<TaskOutcome, OrchestrationError> {
                Ok(TaskOutcome::success(json!({"ok": true}), 0.2))
            }

            fn descriptor(&self) -> crate::agent::AgentDescriptor {
                crate::agent::AgentDescriptor {
                    id: AgentId::generate(),
                    name: "low-quality".into(),
                    agent_type: AgentType::General,
                    capabilities: vec![],
                    expertise_weight: 1.0,
                }
            }
        }

        let mut crew = Crew::new(CrewConfig {
            process_mode: ProcessMode::Sequential,
            require_review: true,
            quality_threshold: 0.8,
            ..Default::default()
        });
        crew.add_member(agent_id.clone(), Role::Executor).unwrap();
        crew.add_task(Task::new("t", "d").requiring_review());

        let mut executors: HashMap<AgentId, Arc<dyn AgentExecutor>> = HashMap::new();
        executors.insert(agent_id, Arc::new(LowQuality));

        let mut metrics = MetricsRegistry::new();
        let mut scheduler = CrewScheduler::new(&mut crew, &mut pool, &executors);
        let summary = scheduler.run(&mut metrics, 0).await.unwrap();

        assert!(summary.completed.is_empty());
        assert_eq!(summary.failed.len(), 1);
    }
}
