//! Consensus Builder (§4.B) — owns a list of [`Proposal`]s and the
//! [`VotingSession`]s opened against them, and drives an iterative
//! refinement loop: re-vote, adjust proposal weights, repeat, until
//! convergence or a round cap. The refinement policy is recorded as a
//! resolved Open Question in DESIGN.md.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::OrchestrationError;
use crate::ids::ProposalId;
use crate::vote::{Vote, VoterConfig, VotingSession, VotingStrategy};

/// Lifecycle of a [`Proposal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Voting,
    Accepted,
    Rejected,
}

/// A candidate decision under consideration by the Consensus Builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer_id: String,
    pub title: String,
    pub description: String,
    pub proposal_type: String,
    pub candidate_options: Option<Vec<String>>,
    pub status: ProposalStatus,
    sessions: Vec<VotingSession>,
}

impl Proposal {
    pub fn new(
        proposer_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        proposal_type: impl Into<String>,
    ) -> Self {
        Self {
            id: ProposalId::generate(),
            proposer_id: proposer_id.into(),
            title: title.into(),
            description: description.into(),
            proposal_type: proposal_type.into(),
            candidate_options: None,
            status: ProposalStatus::Draft,
            sessions: Vec::new(),
        }
    }

    pub fn with_candidates(mut self, options: Vec<String>) -> Self {
        self.candidate_options = Some(options);
        self
    }

    /// Most recent voting session, if one has ever been opened.
    pub fn current_session(&self) -> Option<&VotingSession> {
        self.sessions.last()
    }

    pub fn current_session_mut(&mut self) -> Option<&mut VotingSession> {
        self.sessions.last_mut()
    }

    pub fn sessions(&self) -> &[VotingSession] {
        &self.sessions
    }

    /// Consensus score: share of yes-votes in the final session, i.e. the
    /// winning share of the latest completed session, or 0.0 if none exist.
    pub fn consensus_score(&self) -> f64 {
        self.sessions
            .iter()
            .rev()
            .find_map(|s| s.result())
            .map(|r| r.winning_share)
            .unwrap_or(0.0)
    }

    /// Open a new voting session on this proposal, preserving prior sessions
    /// as history. Transitions draft → voting on the first call.
    fn open_session(
        &mut self,
        strategy: VotingStrategy,
        threshold: Option<f64>,
        eligible_voters: HashSet<String>,
    ) -> &mut VotingSession {
        self.status = ProposalStatus::Voting;
        let session = VotingSession::open(self.id.clone(), strategy, threshold, eligible_voters);
        self.sessions.push(session);
        self.sessions.last_mut().expect("just pushed")
    }
}

/// Configuration for the iterative-refinement loop (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsensusConfig {
    pub max_rounds: usize,
    pub consensus_threshold: f64,
    pub improvement_threshold: f64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            consensus_threshold: 0.7,
            improvement_threshold: 0.02,
        }
    }
}

/// Stateful owner of proposals and their voting history.
#[derive(Default)]
pub struct ConsensusBuilder {
    proposals: Vec<Proposal>,
}

impl ConsensusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, proposal: Proposal) -> ProposalId {
        let id = proposal.id.clone();
        self.proposals.push(proposal);
        id
    }

    pub fn get(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|p| &p.id == id)
    }

    pub fn get_mut(&mut self, id: &ProposalId) -> Option<&mut Proposal> {
        self.proposals.iter_mut().find(|p| &p.id == id)
    }

    /// Open the first voting session on a proposal and transition it to `voting`.
    pub fn start_voting(
        &mut self,
        id: &ProposalId,
        strategy: VotingStrategy,
        threshold: Option<f64>,
        eligible_voters: HashSet<String>,
    ) -> Result<(), OrchestrationError> {
        let proposal = self
            .get_mut(id)
            .ok_or_else(|| OrchestrationError::MemberNotPresent(id.to_string()))?;
        proposal.open_session(strategy, threshold, eligible_voters);
        Ok(())
    }

    pub fn cast_vote(&mut self, id: &ProposalId, vote: Vote) -> Result<(), OrchestrationError> {
        let proposal = self
            .get_mut(id)
            .ok_or_else(|| OrchestrationError::MemberNotPresent(id.to_string()))?;
        let session = proposal
            .current_session_mut()
            .ok_or_else(|| OrchestrationError::InvalidConfiguration("voting not started".into()))?;
        session.cast_vote(vote)
    }

    /// Complete the current session and transition the proposal to
    /// accepted/rejected based on whether the result passed.
    pub fn complete_voting(
        &mut self,
        id: &ProposalId,
        voter_config: &VoterConfig,
        total_agents: usize,
    ) -> Result<(), OrchestrationError> {
        let proposal = self
            .get_mut(id)
            .ok_or_else(|| OrchestrationError::MemberNotPresent(id.to_string()))?;
        let session = proposal
            .current_session_mut()
            .ok_or_else(|| OrchestrationError::InvalidConfiguration("voting not started".into()))?;
        let result = session.complete(voter_config, total_agents);
        proposal.status = if result.passed {
            ProposalStatus::Accepted
        } else {
            ProposalStatus::Rejected
        };
        Ok(())
    }

    /// Iterative refinement: re-open voting on the same proposal for up to
    /// `config.max_rounds` rounds while the consensus score is below
    /// threshold and round-over-round improvement exceeds
    /// `improvement_threshold`. Each round re-casts the same votes (the
    /// caller is responsible for soliciting fresh votes between rounds via
    /// `vote_fn`); terminates on convergence, max rounds, or stagnation.
    pub fn refine_until_converged<F>(
        &mut self,
        id: &ProposalId,
        config: &ConsensusConfig,
        voter_config: &VoterConfig,
        total_agents: usize,
        mut vote_fn: F,
    ) -> Result<ConsensusOutcome, OrchestrationError>
    where
        F: FnMut(usize) -> Vec<Vote>,
    {
        let mut previous_score = 0.0_f64;
        let mut rounds_run = 0usize;

        for round in 0..config.max_rounds {
            let votes = vote_fn(round);
            let eligible: HashSet<String> = votes.iter().map(|v| v.voter_id.clone()).collect();

            self.start_voting(id, voter_config.strategy, voter_config.threshold, eligible)?;
            for vote in votes {
                self.cast_vote(id, vote)?;
            }
            self.complete_voting(id, voter_config, total_agents)?;
            rounds_run += 1;

            let proposal = self
                .get(id)
                .ok_or_else(|| OrchestrationError::MemberNotPresent(id.to_string()))?;
            let score = proposal.consensus_score();

            if score >= config.consensus_threshold {
                return Ok(ConsensusOutcome {
                    rounds: rounds_run,
                    final_score: score,
                    converged: true,
                });
            }

            let improvement = score - previous_score;
            previous_score = score;
            if round > 0 && improvement < config.improvement_threshold {
                return Ok(ConsensusOutcome {
                    rounds: rounds_run,
                    final_score: score,
                    converged: false,
                });
            }
        }

        let final_score = self
            .get(id)
            .map(|p| p.consensus_score())
            .unwrap_or(previous_score);
        Ok(ConsensusOutcome {
            rounds: rounds_run,
            final_score,
            converged: false,
        })
    }
}

/// Result of running the iterative-refinement loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusOutcome {
    pub rounds: usize,
    pub final_score: f64,
    pub converged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voters(n: usize) -> HashSet<String> {
        (0..n).map(|i| format!("v{i}")).collect()
    }

    #[test]
    fn proposal_starts_in_draft() {
        let proposal = Proposal::new("p1", "title", "desc", "design");
        assert_eq!(proposal.status, ProposalStatus::Draft);
        assert_eq!(proposal.consensus_score(), 0.0);
    }

    #[test]
    fn start_voting_transitions_to_voting_and_records_history() {
        let mut builder = ConsensusBuilder::new();
        let id = builder.submit(Proposal::new("p1", "t", "d", "design"));

        builder
            .start_voting(&id, VotingStrategy::Majority, None, voters(2))
            .unwrap();
        assert_eq!(builder.get(&id).unwrap().status, ProposalStatus::Voting);

        builder.cast_vote(&id, Vote::single("v0", "yes")).unwrap();
        builder.cast_vote(&id, Vote::single("v1", "yes")).unwrap();
        builder
            .complete_voting(&id, &VoterConfig::default(), 2)
            .unwrap();

        assert_eq!(builder.get(&id).unwrap().status, ProposalStatus::Accepted);
        assert_eq!(builder.get(&id).unwrap().sessions().len(), 1);
    }

    #[test]
    fn refinement_converges_when_score_crosses_threshold() {
        let mut builder = ConsensusBuilder::new();
        let id = builder.submit(Proposal::new("p1", "t", "d", "design"));
        let config = ConsensusConfig {
            max_rounds: 3,
            consensus_threshold: 0.7,
            improvement_threshold: 0.01,
        };

        let outcome = builder
            .refine_until_converged(&id, &config, &VoterConfig::default(), 3, |round| {
                // Round 0: 1/3 yes (low). Round 1: 3/3 yes (crosses threshold).
                if round == 0 {
                    vec![
                        Vote::single("v0", "yes"),
                        Vote::single("v1", "no"),
                        Vote::single("v2", "no"),
                    ]
                } else {
                    vec![
                        Vote::single("v0", "yes"),
                        Vote::single("v1", "yes"),
                        Vote::single("v2", "yes"),
                    ]
                }
            })
            .unwrap();

        assert!(outcome.converged);
        assert_eq!(outcome.rounds, 2);
        assert!(outcome.final_score >= 0.7);
    }

    #[test]
    fn refinement_stops_on_stagnation() {
        let mut builder = ConsensusBuilder::new();
        let id = builder.submit(Proposal::new("p1", "t", "d", "design"));
        let config = ConsensusConfig {
            max_rounds: 5,
            consensus_threshold: 0.99,
            improvement_threshold: 0.5,
        };

        let outcome = builder
            .refine_until_converged(&id, &config, &VoterConfig::default(), 2, |_round| {
                vec![Vote::single("v0", "yes"), Vote::single("v1", "no")]
            })
            .unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.rounds, 2);
    }

    #[test]
    fn refinement_stops_at_max_rounds() {
        let mut builder = ConsensusBuilder::new();
        let id = builder.submit(Proposal::new("p1", "t", "d", "design"));
        let config = ConsensusConfig {
            max_rounds: 2,
            consensus_threshold: 0.99,
            improvement_threshold: 0.0,
        };

        let outcome = builder
            .refine_until_converged(&id, &config, &VoterConfig::default(), 2, |round| {
                vec![
                    Vote::single("v0", "yes"),
                    Vote::single("v1", if round == 0 { "no" } else { "yes" }),
                ]
            })
            .unwrap();

        assert_eq!(outcome.rounds, 2);
    }
}
