//! Cast Vote use case — drives a single [`Proposal`] through the Consensus
//! Builder directly: submit, open voting, record ballots, close, report.

use std::collections::HashSet;

use maoc_domain::consensus::{ConsensusBuilder, Proposal};
use maoc_domain::error::OrchestrationError;
use maoc_domain::ids::ProposalId;
use maoc_domain::vote::{Vote, VoterConfig};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CastVoteError {
    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),
}

/// A thin, stateful wrapper a presentation layer can hold across repeated
/// CLI invocations of `maoc vote cast` against the same proposal.
#[derive(Default)]
pub struct CastVoteUseCase {
    builder: ConsensusBuilder,
}

impl CastVoteUseCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, proposal: Proposal) -> ProposalId {
        info!(title = %proposal.title, "submitting proposal");
        self.builder.submit(proposal)
    }

    pub fn open_voting(
        &mut self,
        id: &ProposalId,
        config: &VoterConfig,
        eligible_voters: HashSet<String>,
    ) -> Result<(), CastVoteError> {
        self.builder
            .start_voting(id, config.strategy, config.threshold, eligible_voters)?;
        Ok(())
    }

    pub fn cast(&mut self, id: &ProposalId, vote: Vote) -> Result<(), CastVoteError> {
        self.builder.cast_vote(id, vote)?;
        Ok(())
    }

    pub fn close(
        &mut self,
        id: &ProposalId,
        config: &VoterConfig,
        total_agents: usize,
    ) -> Result<(), CastVoteError> {
        self.builder.complete_voting(id, config, total_agents)?;
        Ok(())
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.builder.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_produces_a_winner() {
        let mut use_case = CastVoteUseCase::new();
        let proposal = Proposal::new("alice", "adopt plan A", "swap the scheduler", "decision");
        let id = use_case.submit(proposal);

        let config = VoterConfig::default();
        let eligible: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        use_case.open_voting(&id, &config, eligible).unwrap();

        use_case.cast(&id, Vote::single("a", "yes")).unwrap();
        use_case.cast(&id, Vote::single("b", "yes")).unwrap();
        use_case.cast(&id, Vote::single("c", "no")).unwrap();

        use_case.close(&id, &config, 3).unwrap();

        let proposal = use_case.proposal(&id).unwrap();
        let result = proposal.current_session().unwrap().result().unwrap();
        assert_eq!(result.winner.as_deref(), Some("yes"));
        assert!(result.passed);
    }
}
