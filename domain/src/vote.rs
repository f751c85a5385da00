//! Vote Aggregator (§4.A) — a pure evaluator mapping (votes, strategy, config)
//! to a [`VoteResult`], plus [`VotingSession`], the stateful append-only
//! ballot box the Consensus Builder and Crew Scheduler open per decision.

use crate::error::OrchestrationError;
use crate::ids::{ProposalId, VotingSessionId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// What a voter cast: a single candidate, an ordered ranking, or an approval set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    Single(String),
    Ranked(Vec<String>),
    Approval(HashSet<String>),
}

/// A single recorded vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub voter_id: String,
    pub choice: Choice,
    pub weight: f64,
    pub confidence: f64,
    pub reasoning: Option<String>,
}

impl Vote {
    pub fn single(voter_id: impl Into<String>, choice: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            choice: Choice::Single(choice.into()),
            weight: 1.0,
            confidence: 1.0,
            reasoning: None,
        }
    }

    pub fn ranked(voter_id: impl Into<String>, ranking: Vec<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            choice: Choice::Ranked(ranking),
            weight: 1.0,
            confidence: 1.0,
            reasoning: None,
        }
    }

    pub fn approval(voter_id: impl Into<String>, approved: HashSet<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            choice: Choice::Approval(approved),
            weight: 1.0,
            confidence: 1.0,
            reasoning: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    fn single_choice(&self) -> Option<&str> {
        match &self.choice {
            Choice::Single(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// The closed set of aggregation strategies the Vote Aggregator supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VotingStrategy {
    Majority,
    Plurality,
    Unanimity,
    Weighted,
    Threshold,
    Supermajority,
    RankedChoice,
    Approval,
}

/// Configuration for a vote, per the external configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoterConfig {
    pub strategy: VotingStrategy,
    pub threshold: Option<f64>,
    pub min_votes: usize,
    pub require_quorum: bool,
    pub quorum_share: f64,
}

impl Default for VoterConfig {
    fn default() -> Self {
        Self {
            strategy: VotingStrategy::Majority,
            threshold: None,
            min_votes: 1,
            require_quorum: false,
            quorum_share: 0.5,
        }
    }
}

/// Why a vote could not produce a decision — surfaced via [`VoteResult`]
/// metadata, never by raising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteAnomaly {
    EmptyBallot,
    QuorumNotMet,
    UnsupportedStrategy,
}

/// Outcome of aggregating a set of votes under a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub strategy: VotingStrategy,
    pub winner: Option<String>,
    pub passed: bool,
    pub consensus: bool,
    pub winning_share: f64,
    pub total_votes: usize,
    pub total_weight: f64,
    pub rounds: usize,
    pub anomaly: Option<VoteAnomaly>,
    pub votes: Vec<Vote>,
}

impl VoteResult {
    fn anomalous(strategy: VotingStrategy, anomaly: VoteAnomaly, votes: Vec<Vote>) -> Self {
        let total_weight = votes.iter().map(|v| v.weight).sum();
        let total_votes = votes.len();
        Self {
            strategy,
            winner: None,
            passed: false,
            consensus: false,
            winning_share: 0.0,
            total_votes,
            total_weight,
            rounds: 0,
            anomaly: Some(anomaly),
            votes,
        }
    }

    /// Average confidence among voters who picked the eventual winner.
    pub fn winner_avg_confidence(&self) -> Option<f64> {
        let winner = self.winner.as_ref()?;
        let (sum, count) = self
            .votes
            .iter()
            .filter(|v| v.single_choice() == Some(winner.as_str()))
            .fold((0.0, 0usize), |(sum, count), v| (sum + v.confidence, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}

/// Count first-preference-style occurrences of each `Single` choice, in the
/// order each distinct choice was first recorded.
fn tally_single(votes: &[Vote]) -> (Vec<String>, HashMap<String, usize>) {
    let mut order = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for vote in votes {
        if let Some(choice) = vote.single_choice() {
            if !counts.contains_key(choice) {
                order.push(choice.to_string());
            }
            *counts.entry(choice.to_string()).or_insert(0) += 1;
        }
    }
    (order, counts)
}

fn tally_weighted(votes: &[Vote]) -> (Vec<String>, HashMap<String, f64>) {
    let mut order = Vec::new();
    let mut weights: HashMap<String, f64> = HashMap::new();
    for vote in votes {
        if let Some(choice) = vote.single_choice() {
            if !weights.contains_key(choice) {
                order.push(choice.to_string());
            }
            *weights.entry(choice.to_string()).or_insert(0.0) += vote.weight;
        }
    }
    (order, weights)
}

/// Top entry by count, ties broken by first-recorded order.
fn top_by_count(order: &[String], counts: &HashMap<String, usize>) -> Option<(String, usize)> {
    order
        .iter()
        .map(|k| (k.clone(), counts[k]))
        .max_by_key(|(_, c)| *c)
        .map(|(k, c)| {
            let tied_first = order.iter().find(|o| counts[*o] == c).unwrap().clone();
            (tied_first, counts[&k])
        })
}

fn top_by_weight(order: &[String], weights: &HashMap<String, f64>) -> Option<(String, f64)> {
    let max_weight = order
        .iter()
        .map(|k| weights[k])
        .fold(f64::MIN, f64::max);
    order
        .iter()
        .find(|k| (weights[*k] - max_weight).abs() < f64::EPSILON)
        .map(|k| (k.clone(), weights[k]))
}

/// Pure aggregation: (votes, strategy, config) → [`VoteResult`]. No mutable state.
pub fn aggregate(votes: Vec<Vote>, config: &VoterConfig, total_agents: usize) -> VoteResult {
    if votes.is_empty() {
        return VoteResult::anomalous(config.strategy, VoteAnomaly::EmptyBallot, votes);
    }
    if votes.len() < config.min_votes {
        return VoteResult::anomalous(config.strategy, VoteAnomaly::QuorumNotMet, votes);
    }
    if config.require_quorum
        && total_agents > 0
        && (votes.len() as f64 / total_agents as f64) < config.quorum_share
    {
        return VoteResult::anomalous(config.strategy, VoteAnomaly::QuorumNotMet, votes);
    }

    match config.strategy {
        VotingStrategy::Majority => aggregate_majority(votes),
        VotingStrategy::Plurality => aggregate_plurality(votes),
        VotingStrategy::Unanimity => aggregate_unanimity(votes),
        VotingStrategy::Weighted => aggregate_weighted(votes, config.threshold.unwrap_or(0.5)),
        VotingStrategy::Threshold => aggregate_threshold(votes, config.threshold.unwrap_or(0.5)),
        VotingStrategy::Supermajority => aggregate_supermajority(votes),
        VotingStrategy::RankedChoice => aggregate_ranked_choice(votes),
        VotingStrategy::Approval => aggregate_approval(votes, config.threshold.unwrap_or(0.5)),
    }
}

fn aggregate_majority(votes: Vec<Vote>) -> VoteResult {
    let (order, counts) = tally_single(&votes);
    if order.is_empty() {
        return VoteResult::anomalous(VotingStrategy::Majority, VoteAnomaly::UnsupportedStrategy, votes);
    }
    let total = votes.len();
    let (top, count) = top_by_count(&order, &counts).expect("non-empty order");
    let share = count as f64 / total as f64;
    let won = share > 0.5;
    VoteResult {
        strategy: VotingStrategy::Majority,
        winner: won.then_some(top),
        passed: won,
        consensus: won,
        winning_share: share,
        total_votes: total,
        total_weight: votes.iter().map(|v| v.weight).sum(),
        rounds: 1,
        anomaly: None,
        votes,
    }
}

fn aggregate_plurality(votes: Vec<Vote>) -> VoteResult {
    let (order, counts) = tally_single(&votes);
    if order.is_empty() {
        return VoteResult::anomalous(VotingStrategy::Plurality, VoteAnomaly::UnsupportedStrategy, votes);
    }
    let total = votes.len();
    let (top, count) = top_by_count(&order, &counts).expect("non-empty order");
    let share = count as f64 / total as f64;
    let passed = share > 0.5;
    VoteResult {
        strategy: VotingStrategy::Plurality,
        winner: Some(top),
        passed,
        consensus: passed,
        winning_share: share,
        total_votes: total,
        total_weight: votes.iter().map(|v| v.weight).sum(),
        rounds: 1,
        anomaly: None,
        votes,
    }
}

fn aggregate_unanimity(votes: Vec<Vote>) -> VoteResult {
    let (order, counts) = tally_single(&votes);
    if order.is_empty() {
        return VoteResult::anomalous(VotingStrategy::Unanimity, VoteAnomaly::UnsupportedStrategy, votes);
    }
    let total = votes.len();
    let unanimous = order.len() == 1;
    let winner = unanimous.then(|| order[0].clone());
    let share = if unanimous {
        1.0
    } else {
        counts[&order[0]] as f64 / total as f64
    };
    VoteResult {
        strategy: VotingStrategy::Unanimity,
        winner,
        passed: unanimous,
        consensus: unanimous,
        winning_share: share,
        total_votes: total,
        total_weight: votes.iter().map(|v| v.weight).sum(),
        rounds: 1,
        anomaly: None,
        votes,
    }
}

fn aggregate_weighted(votes: Vec<Vote>, threshold: f64) -> VoteResult {
    let (order, weights) = tally_weighted(&votes);
    if order.is_empty() {
        return VoteResult::anomalous(VotingStrategy::Weighted, VoteAnomaly::UnsupportedStrategy, votes);
    }
    let total_weight: f64 = votes.iter().map(|v| v.weight).sum();
    let (top, top_weight) = top_by_weight(&order, &weights).expect("non-empty order");
    let share = if total_weight > 0.0 {
        top_weight / total_weight
    } else {
        0.0
    };
    let passed = share > threshold;
    VoteResult {
        strategy: VotingStrategy::Weighted,
        winner: Some(top),
        passed,
        consensus: passed,
        winning_share: share,
        total_votes: votes.len(),
        total_weight,
        rounds: 1,
        anomaly: None,
        votes,
    }
}

fn aggregate_threshold(votes: Vec<Vote>, threshold: f64) -> VoteResult {
    let (order, counts) = tally_single(&votes);
    if order.is_empty() {
        return VoteResult::anomalous(VotingStrategy::Threshold, VoteAnomaly::UnsupportedStrategy, votes);
    }
    let total = votes.len();
    let (top, count) = top_by_count(&order, &counts).expect("non-empty order");
    let share = count as f64 / total as f64;
    let met = share >= threshold;
    VoteResult {
        strategy: VotingStrategy::Threshold,
        winner: met.then_some(top),
        passed: met,
        consensus: met,
        winning_share: share,
        total_votes: total,
        total_weight: votes.iter().map(|v| v.weight).sum(),
        rounds: 1,
        anomaly: None,
        votes,
    }
}

fn aggregate_supermajority(votes: Vec<Vote>) -> VoteResult {
    const SUPERMAJORITY_SHARE: f64 = 2.0 / 3.0;
    let (order, weights) = tally_weighted(&votes);
    if order.is_empty() {
        return VoteResult::anomalous(VotingStrategy::Supermajority, VoteAnomaly::UnsupportedStrategy, votes);
    }
    let total_weight: f64 = votes.iter().map(|v| v.weight).sum();
    let (top, top_weight) = top_by_weight(&order, &weights).expect("non-empty order");
    let share = if total_weight > 0.0 {
        top_weight / total_weight
    } else {
        0.0
    };
    let met = share >= SUPERMAJORITY_SHARE;
    VoteResult {
        strategy: VotingStrategy::Supermajority,
        winner: met.then_some(top),
        passed: met,
        consensus: met,
        winning_share: share,
        total_votes: votes.len(),
        total_weight,
        rounds: 1,
        anomaly: None,
        votes,
    }
}

fn aggregate_approval(votes: Vec<Vote>, threshold: f64) -> VoteResult {
    let total = votes.len();
    let mut order = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut saw_approval = false;
    for vote in &votes {
        if let Choice::Approval(set) = &vote.choice {
            saw_approval = true;
            for option in set {
                if !counts.contains_key(option) {
                    order.push(option.clone());
                }
                *counts.entry(option.clone()).or_insert(0) += 1;
            }
        }
    }
    if !saw_approval || order.is_empty() {
        return VoteResult::anomalous(VotingStrategy::Approval, VoteAnomaly::UnsupportedStrategy, votes);
    }
    let (top, count) = top_by_count(&order, &counts).expect("non-empty order");
    let share = count as f64 / total as f64;
    let passed = share >= threshold;
    let consensus = share > 0.5;
    VoteResult {
        strategy: VotingStrategy::Approval,
        winner: Some(top),
        passed,
        consensus,
        winning_share: share,
        total_votes: total,
        total_weight: votes.iter().map(|v| v.weight).sum(),
        rounds: 1,
        anomaly: None,
        votes,
    }
}

/// Instant-runoff voting. See §4.A for the exact elimination/advance rules.
fn aggregate_ranked_choice(votes: Vec<Vote>) -> VoteResult {
    let rankings: Vec<&Vec<String>> = votes
        .iter()
        .filter_map(|v| match &v.choice {
            Choice::Ranked(r) => Some(r),
            _ => None,
        })
        .collect();

    if rankings.is_empty() {
        return VoteResult::anomalous(VotingStrategy::RankedChoice, VoteAnomaly::UnsupportedStrategy, votes);
    }

    // Discovery order of distinct options, scanning ballots in order.
    let mut option_order: Vec<String> = Vec::new();
    for ranking in &rankings {
        for option in *ranking {
            if !option_order.contains(option) {
                option_order.push(option.clone());
            }
        }
    }

    let mut eliminated: HashSet<String> = HashSet::new();
    // Per-ballot cursor into its ranking (index of current non-eliminated pick).
    let mut cursors: Vec<usize> = vec![0; rankings.len()];
    let max_rounds = option_order.len().max(1);
    let mut rounds = 0;
    let mut last_round_counts: HashMap<String, usize> = HashMap::new();

    loop {
        rounds += 1;

        // Advance each ballot's cursor past any eliminated options.
        let mut current_picks: Vec<Option<&str>> = Vec::with_capacity(rankings.len());
        for (i, ranking) in rankings.iter().enumerate() {
            while cursors[i] < ranking.len() && eliminated.contains(&ranking[cursors[i]]) {
                cursors[i] += 1;
            }
            current_picks.push(ranking.get(cursors[i]).map(|s| s.as_str()));
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for opt in option_order.iter().filter(|o| !eliminated.contains(*o)) {
            counts.insert(opt.clone(), 0);
        }
        let mut ballots_cast = 0usize;
        for pick in &current_picks {
            if let Some(choice) = pick {
                *counts.entry(choice.to_string()).or_insert(0) += 1;
                ballots_cast += 1;
            }
        }
        last_round_counts = counts.clone();

        if ballots_cast == 0 {
            // No voter has a non-eliminated choice left.
            break;
        }

        if let Some((winner, count)) = counts
            .iter()
            .max_by_key(|(_, c)| **c)
            .map(|(k, c)| (k.clone(), *c))
        {
            let share = count as f64 / ballots_cast as f64;
            if share > 0.5 {
                return VoteResult {
                    strategy: VotingStrategy::RankedChoice,
                    winner: Some(winner),
                    passed: true,
                    consensus: true,
                    winning_share: share,
                    total_votes: votes.len(),
                    total_weight: votes.iter().map(|v| v.weight).sum(),
                    rounds,
                    anomaly: None,
                    votes,
                };
            }
        }

        let remaining: Vec<&String> = option_order.iter().filter(|o| !eliminated.contains(*o)).collect();
        if remaining.len() <= 1 || rounds >= max_rounds {
            break;
        }

        // Eliminate the lowest count, ties broken by first-recorded order.
        let min_count = remaining.iter().map(|o| counts.get(*o).copied().unwrap_or(0)).min().unwrap_or(0);
        let to_eliminate = remaining
            .iter()
            .find(|o| counts.get(**o).copied().unwrap_or(0) == min_count)
            .map(|o| (*o).clone());
        if let Some(opt) = to_eliminate {
            eliminated.insert(opt);
        } else {
            break;
        }
    }

    // No outright majority found: return the last round's plurality winner, consensus=false.
    let fallback = last_round_counts
        .iter()
        .max_by_key(|(_, c)| **c)
        .map(|(k, c)| (k.clone(), *c));
    let total_cast: usize = last_round_counts.values().sum();
    let (winner, share) = match fallback {
        Some((w, c)) if total_cast > 0 => (Some(w), c as f64 / total_cast as f64),
        _ => (None, 0.0),
    };

    VoteResult {
        strategy: VotingStrategy::RankedChoice,
        winner,
        passed: false,
        consensus: false,
        winning_share: share,
        total_votes: votes.len(),
        total_weight: votes.iter().map(|v| v.weight).sum(),
        rounds,
        anomaly: None,
        votes,
    }
}

/// Terminal outcome of a [`VotingSession`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionOutcome {
    Pending,
    Completed(VoteResult),
}

/// Stateful, append-only ballot box for one decision.
///
/// Votes accumulate until [`VotingSession::complete`] is called; once
/// completed the outcome is immutable (monotonic per the core invariants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingSession {
    pub id: VotingSessionId,
    pub proposal_id: ProposalId,
    pub strategy: VotingStrategy,
    pub threshold: Option<f64>,
    eligible_voters: HashSet<String>,
    votes: Vec<Vote>,
    outcome: SessionOutcome,
}

impl VotingSession {
    pub fn open(
        proposal_id: ProposalId,
        strategy: VotingStrategy,
        threshold: Option<f64>,
        eligible_voters: HashSet<String>,
    ) -> Self {
        Self {
            id: VotingSessionId::generate(),
            proposal_id,
            strategy,
            threshold,
            eligible_voters,
            votes: Vec::new(),
            outcome: SessionOutcome::Pending,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, SessionOutcome::Completed(_))
    }

    pub fn result(&self) -> Option<&VoteResult> {
        match &self.outcome {
            SessionOutcome::Completed(result) => Some(result),
            SessionOutcome::Pending => None,
        }
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// Record a vote. Rejects votes from ineligible voters, duplicate voters,
    /// or a session that has already completed.
    pub fn cast_vote(&mut self, vote: Vote) -> Result<(), OrchestrationError> {
        if self.is_completed() {
            return Err(OrchestrationError::InvalidConfiguration(
                "voting session already completed".into(),
            ));
        }
        if !self.eligible_voters.contains(&vote.voter_id) {
            return Err(OrchestrationError::VoterIneligible(vote.voter_id.clone()));
        }
        if self.votes.iter().any(|v| v.voter_id == vote.voter_id) {
            return Err(OrchestrationError::DuplicateVote(vote.voter_id.clone()));
        }
        self.votes.push(vote);
        Ok(())
    }

    /// Aggregate the recorded votes and freeze the outcome. Calling this
    /// again on an already-completed session is a no-op that returns the
    /// original, unchanged result.
    pub fn complete(&mut self, config: &VoterConfig, total_agents: usize) -> &VoteResult {
        if !self.is_completed() {
            let result = aggregate(self.votes.clone(), config, total_agents);
            self.outcome = SessionOutcome::Completed(result);
        }
        match &self.outcome {
            SessionOutcome::Completed(result) => result,
            SessionOutcome::Pending => unreachable!("just completed above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(strategy: VotingStrategy) -> VoterConfig {
        VoterConfig {
            strategy,
            ..Default::default()
        }
    }

    #[test]
    fn scenario_majority_vote_five_voters() {
        let votes = vec![
            Vote::single("v1", "A").with_confidence(0.9),
            Vote::single("v2", "A").with_confidence(0.85),
            Vote::single("v3", "B").with_confidence(0.7),
            Vote::single("v4", "A").with_confidence(0.95),
            Vote::single("v5", "C").with_confidence(0.6),
        ];
        let result = aggregate(votes, &config(VotingStrategy::Majority), 5);

        assert_eq!(result.winner.as_deref(), Some("A"));
        assert!((result.winning_share - 0.6).abs() < 1e-9);
        assert!(result.consensus);
        assert!((result.winner_avg_confidence().unwrap() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn scenario_irv_five_voters_three_options() {
        let ballots = vec![
            vec!["A", "B", "C"],
            vec!["A", "C", "B"],
            vec!["B", "A", "C"],
            vec!["B", "C", "A"],
            vec!["C", "A", "B"],
        ];
        let votes: Vec<Vote> = ballots
            .into_iter()
            .enumerate()
            .map(|(i, ranking)| {
                Vote::ranked(
                    format!("v{i}"),
                    ranking.into_iter().map(String::from).collect(),
                )
            })
            .collect();

        let result = aggregate(votes, &config(VotingStrategy::RankedChoice), 5);

        assert_eq!(result.winner.as_deref(), Some("A"));
        assert_eq!(result.rounds, 2);
        assert!(result.consensus);
    }

    #[test]
    fn scenario_weighted_vote() {
        let votes = vec![
            Vote::single("v1", "X").with_weight(3.0),
            Vote::single("v2", "X").with_weight(1.0),
            Vote::single("v3", "Y").with_weight(5.0),
        ];
        let mut cfg = config(VotingStrategy::Weighted);
        cfg.threshold = Some(0.6);
        let result = aggregate(votes, &cfg, 3);

        assert_eq!(result.winner.as_deref(), Some("Y"));
        assert!(!result.passed);
        assert!(!result.consensus);
        assert!((result.winning_share - 5.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn scenario_swarm_democratic_vote() {
        let votes = vec![
            Vote::single("agent-1", "alpha").with_confidence(0.8),
            Vote::single("agent-2", "alpha").with_confidence(0.9),
            Vote::single("agent-3", "beta").with_confidence(0.95),
        ];
        let result = aggregate(votes, &config(VotingStrategy::Majority), 3);

        assert_eq!(result.winner.as_deref(), Some("alpha"));
        assert!(result.consensus);
        assert!((result.winning_share - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_ballot_is_an_anomaly_not_an_error() {
        let result = aggregate(Vec::new(), &config(VotingStrategy::Majority), 5);
        assert_eq!(result.anomaly, Some(VoteAnomaly::EmptyBallot));
        assert!(result.winner.is_none());
    }

    #[test]
    fn quorum_not_met_when_share_too_low() {
        let votes = vec![Vote::single("v1", "A")];
        let mut cfg = config(VotingStrategy::Majority);
        cfg.require_quorum = true;
        cfg.quorum_share = 0.5;
        let result = aggregate(votes, &cfg, 10);
        assert_eq!(result.anomaly, Some(VoteAnomaly::QuorumNotMet));
    }

    #[test]
    fn unanimity_requires_single_distinct_choice() {
        let votes = vec![Vote::single("v1", "A"), Vote::single("v2", "A")];
        let result = aggregate(votes, &config(VotingStrategy::Unanimity), 2);
        assert!(result.passed);
        assert_eq!(result.winner.as_deref(), Some("A"));

        let votes = vec![Vote::single("v1", "A"), Vote::single("v2", "B")];
        let result = aggregate(votes, &config(VotingStrategy::Unanimity), 2);
        assert!(!result.passed);
        assert!(result.winner.is_none());
    }

    #[test]
    fn weighted_with_equal_weights_matches_majority() {
        let votes_for_weighted = vec![
            Vote::single("v1", "A").with_weight(1.0),
            Vote::single("v2", "A").with_weight(1.0),
            Vote::single("v3", "B").with_weight(1.0),
        ];
        let votes_for_majority = votes_for_weighted.clone();

        let mut weighted_cfg = config(VotingStrategy::Weighted);
        weighted_cfg.threshold = Some(0.5);
        let weighted = aggregate(votes_for_weighted, &weighted_cfg, 3);
        let majority = aggregate(votes_for_majority, &config(VotingStrategy::Majority), 3);

        assert_eq!(weighted.winner, majority.winner);
        assert_eq!(weighted.passed, majority.passed);
    }

    #[test]
    fn voting_session_rejects_duplicate_and_ineligible_votes() {
        let eligible: HashSet<String> = ["v1".to_string(), "v2".to_string()].into_iter().collect();
        let mut session = VotingSession::open(
            ProposalId::generate(),
            VotingStrategy::Majority,
            None,
            eligible,
        );

        session.cast_vote(Vote::single("v1", "A")).unwrap();
        assert!(matches!(
            session.cast_vote(Vote::single("v1", "B")),
            Err(OrchestrationError::DuplicateVote(_))
        ));
        assert!(matches!(
            session.cast_vote(Vote::single("ghost", "A")),
            Err(OrchestrationError::VoterIneligible(_))
        ));
    }

    #[test]
    fn voting_session_outcome_is_monotonic_once_completed() {
        let eligible: HashSet<String> = ["v1".to_string(), "v2".to_string()].into_iter().collect();
        let mut session = VotingSession::open(
            ProposalId::generate(),
            VotingStrategy::Majority,
            None,
            eligible,
        );
        session.cast_vote(Vote::single("v1", "A")).unwrap();
        session.cast_vote(Vote::single("v2", "A")).unwrap();

        let first = session.complete(&config(VotingStrategy::Majority), 2).clone();
        // Completing again must not change the frozen outcome even if called
        // with a different config.
        let second = session
            .complete(&config(VotingStrategy::Plurality), 99)
            .clone();

        assert_eq!(first.winner, second.winner);
        assert_eq!(first.strategy, second.strategy);
    }
}
