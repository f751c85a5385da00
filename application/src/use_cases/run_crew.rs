//! Run Crew use case — drives a pre-assembled [`Crew`] to completion
//! directly, bypassing the Problem Solver's approach selection. Useful when
//! a caller already knows it wants role-structured task execution.

use maoc_domain::cancellation::CancellationFlag;
use maoc_domain::crew::{Crew, CrewRunSummary};
use thiserror::Error;
use tracing::info;

use crate::use_cases::shared::{now_ms, OrchestrationRuntime};

#[derive(Debug, Error)]
pub enum RunCrewError {
    #[error(transparent)]
    Orchestration(#[from] maoc_domain::error::OrchestrationError),
}

pub struct RunCrewUseCase {
    runtime: OrchestrationRuntime,
}

impl RunCrewUseCase {
    pub fn new(runtime: OrchestrationRuntime) -> Self {
        Self { runtime }
    }

    pub async fn execute(&self, crew: &mut Crew) -> Result<CrewRunSummary, RunCrewError> {
        self.execute_with_cancellation(crew, None).await
    }

    pub async fn execute_with_cancellation(
        &self,
        crew: &mut Crew,
        cancellation: Option<CancellationFlag>,
    ) -> Result<CrewRunSummary, RunCrewError> {
        info!(crew_id = %crew.id, process_mode = ?crew.config.process_mode, "running crew");
        let executors = self.runtime.executors_snapshot().await;
        let mut pool = self.runtime.pool().lock().await;
        let mut metrics = self.runtime.metrics().lock().await;

        let mut scheduler = maoc_domain::crew::CrewScheduler::new(crew, &mut pool, &executors);
        if let Some(flag) = cancellation {
            scheduler = scheduler.with_cancellation(flag);
        }
        let summary = scheduler.run(&mut metrics, now_ms()).await?;
        Ok(summary)
    }
}
