use super::{ElectionError, Result};
use crate::tabulator::{self, EmptyRoundPolicy, TabulationOptions};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u32);

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
}

impl Candidate {
    pub fn new(id: u32, name: String) -> Candidate {
        Candidate {
            id: CandidateId(id),
            name,
        }
    }
}

/// A candidate's vote counter within one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub candidate: CandidateId,
    pub votes: u64,
}

/// One voting phase: a fixed candidate list and its own tally.
///
/// `total_votes` is only ever changed together with a tally entry, so it always
/// equals the sum of the entries.
#[derive(Debug, Clone)]
pub struct Round {
    number: usize,
    tallies: Vec<Tally>,
    total_votes: u64,
    winners: Option<Vec<CandidateId>>,
    majority: bool,
    voters: HashSet<String>,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
}

impl Round {
    fn open(number: usize, candidates: impl IntoIterator<Item = CandidateId>) -> Round {
        Round {
            number,
            tallies: candidates
                .into_iter()
                .map(|candidate| Tally {
                    candidate,
                    votes: 0,
                })
                .collect(),
            total_votes: 0,
            winners: None,
            majority: false,
            voters: HashSet::new(),
            opened_at: Utc::now(),
            closed_at: None,
            starts_at: None,
            ends_at: None,
        }
    }

    /// 1-based position of this round in the election.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn tallies(&self) -> &[Tally] {
        &self.tallies
    }

    pub fn candidate_count(&self) -> usize {
        self.tallies.len()
    }

    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    pub fn votes_for(&self, candidate: CandidateId) -> Option<u64> {
        self.tallies
            .iter()
            .find(|t| t.candidate == candidate)
            .map(|t| t.votes)
    }

    /// Candidates advancing from this round, once it is closed.
    pub fn winners(&self) -> Option<&[CandidateId]> {
        self.winners.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.winners.is_some()
    }

    /// Whether the round closed with an outright majority.
    pub fn majority(&self) -> bool {
        self.majority
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.starts_at
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.ends_at
    }

    /// Phase of the round at `now`. A closed round has ended whatever its window says.
    pub fn phase(&self, now: DateTime<Utc>) -> RoundPhase {
        if self.is_closed() {
            return RoundPhase::Ended;
        }
        match (self.starts_at, self.ends_at) {
            (Some(start), _) if now < start => RoundPhase::NotStarted,
            (_, Some(end)) if now >= end => RoundPhase::Ended,
            _ => RoundPhase::Active,
        }
    }

    /// Phase at `now` and the time left until the next transition.
    pub fn window(&self, now: DateTime<Utc>) -> RoundWindow {
        let phase = self.phase(now);
        let remaining = match phase {
            RoundPhase::NotStarted => self.starts_at.map(|start| start - now),
            RoundPhase::Active => self.ends_at.map(|end| end - now),
            RoundPhase::Ended => Some(Duration::zero()),
        };
        RoundWindow { phase, remaining }
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.voters.contains(voter)
    }

    pub fn is_consistent(&self) -> bool {
        self.tallies.iter().map(|t| t.votes).sum::<u64>() == self.total_votes
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.tallies.len() {
            return Err(ElectionError::CandidateOutOfRange {
                index,
                len: self.tallies.len(),
            });
        }
        Ok(())
    }

    fn record(&mut self, index: usize) -> Result<CandidateId> {
        self.check_index(index)?;
        let tally = &mut self.tallies[index];
        tally.votes += 1;
        self.total_votes += 1;
        Ok(tally.candidate)
    }

    fn freeze(&mut self, winners: Vec<CandidateId>, majority: bool) {
        self.winners = Some(winners);
        self.majority = majority;
        self.closed_at = Some(Utc::now());
    }
}

/// Where a round stands relative to its voting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    NotStarted,
    Active,
    Ended,
}

impl Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundPhase::NotStarted => write!(f, "not started"),
            RoundPhase::Active => write!(f, "active"),
            RoundPhase::Ended => write!(f, "ended"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundWindow {
    pub phase: RoundPhase,
    /// Time until the round starts or ends; `None` when that bound is unset.
    pub remaining: Option<Duration>,
}

/// Why an election stopped producing rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// A candidate took a strict majority of a round.
    Majority,
    /// The round budget was used up.
    RoundBudget,
    /// Only one candidate was left to compete.
    SingleCandidate,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Majority => write!(f, "majority"),
            Outcome::RoundBudget => write!(f, "round budget exhausted"),
            Outcome::SingleCandidate => write!(f, "single candidate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionStatus {
    /// The round with this 1-based number accepts ballots.
    RoundOpen(usize),
    Terminal(Outcome),
}

/// Frozen results of a closed round, for the history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResults {
    pub round: usize,
    pub candidates: Vec<CandidateResult>,
    pub total_votes: u64,
    pub winners: Vec<CandidateResult>,
    pub majority: bool,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    pub id: CandidateId,
    pub name: String,
    pub votes: u64,
    /// Share of the round's votes, in percent.
    pub share: f64,
}

impl CandidateResult {
    pub fn percentage(&self) -> u32 {
        self.share.round() as u32
    }
}

/// Runoff election engine.
///
/// Holds the candidate roster and every round played so far. Only the round
/// under `current` accepts ballots; all earlier rounds are frozen.
#[derive(Debug, Clone)]
pub struct Election {
    candidates: Vec<Candidate>,
    rounds: Vec<Round>,
    current: usize,
    outcome: Option<Outcome>,
    options: TabulationOptions,
    registry: BTreeSet<String>,
}

impl Election {
    /// Register candidates by name, with sequential ids starting at 1.
    pub fn new<I, S>(names: I) -> Result<Election>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_options(names, TabulationOptions::default())
    }

    pub fn with_options<I, S>(names: I, options: TabulationOptions) -> Result<Election>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidates = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Candidate::new(i as u32 + 1, name.into()))
            .collect();
        Self::from_candidates(candidates, options)
    }

    pub fn from_candidates(
        candidates: Vec<Candidate>,
        options: TabulationOptions,
    ) -> Result<Election> {
        options.validate()?;
        if candidates.is_empty() {
            return Err(ElectionError::NoCandidates);
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for candidate in &candidates {
            let name = candidate.name.trim();
            if name.is_empty() {
                return Err(ElectionError::InvalidCandidateName);
            }
            if !ids.insert(candidate.id) {
                return Err(ElectionError::DuplicateCandidate(candidate.id.to_string()));
            }
            if !names.insert(name.to_string()) {
                return Err(ElectionError::DuplicateCandidate(name.to_string()));
            }
        }

        let mut first = Round::open(1, candidates.iter().map(|c| c.id));
        let mut outcome = None;
        if candidates.len() == 1 {
            first.freeze(vec![candidates[0].id], false);
            outcome = Some(Outcome::SingleCandidate);
        }

        Ok(Election {
            candidates,
            rounds: vec![first],
            current: 0,
            outcome,
            options,
            registry: BTreeSet::new(),
        })
    }

    pub fn options(&self) -> &TabulationOptions {
        &self.options
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Zero-based index of the current round.
    pub fn current_round_index(&self) -> usize {
        self.current
    }

    /// The open round, or the last round played once the election is over.
    pub fn current_round(&self) -> &Round {
        &self.rounds[self.current]
    }

    /// Candidates of the current round, in ballot order.
    pub fn ballot(&self) -> Vec<&Candidate> {
        self.current_round()
            .tallies()
            .iter()
            .filter_map(|t| self.candidate(t.candidate))
            .collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn status(&self) -> ElectionStatus {
        match self.outcome {
            Some(outcome) => ElectionStatus::Terminal(outcome),
            None => ElectionStatus::RoundOpen(self.current_round().number()),
        }
    }

    /// Candidates qualified by the last closed round.
    pub fn finalists(&self) -> Vec<&Candidate> {
        self.rounds
            .iter()
            .rev()
            .find_map(|r| r.winners())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.candidate(*id))
            .collect()
    }

    /// The declared winner, once the election is over with a single qualifier.
    pub fn winner(&self) -> Option<&Candidate> {
        if !self.is_terminal() {
            return None;
        }
        match self.finalists().as_slice() {
            [winner] => Some(*winner),
            _ => None,
        }
    }

    /// Whether `voter` already cast a ballot in the open round.
    pub fn has_voted(&self, voter: &str) -> bool {
        !self.is_terminal() && self.current_round().has_voted(voter)
    }

    /// Add `voter` to the register consulted when `requireRegistration` is set.
    pub fn register_voter(&mut self, voter: &str) -> Result<()> {
        let voter = voter.trim();
        if voter.is_empty() {
            return Err(ElectionError::InvalidVoterId);
        }
        if !self.registry.insert(voter.to_string()) {
            return Err(ElectionError::VoterAlreadyRegistered(voter.to_string()));
        }
        Ok(())
    }

    /// Remove `voter` from the register. Ballots already cast are kept.
    pub fn remove_voter(&mut self, voter: &str) -> Result<()> {
        if !self.registry.remove(voter.trim()) {
            return Err(ElectionError::UnregisteredVoter(voter.to_string()));
        }
        Ok(())
    }

    pub fn is_registered(&self, voter: &str) -> bool {
        self.registry.contains(voter)
    }

    /// Registered voters, sorted.
    pub fn registered_voters(&self) -> Vec<&str> {
        self.registry.iter().map(String::as_str).collect()
    }

    /// Restrict ballots for the open round to `[starts_at, ends_at)`.
    pub fn schedule_round(
        &mut self,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if self.is_terminal() {
            return Err(ElectionError::ElectionTerminal);
        }
        let round = &mut self.rounds[self.current];
        if let (Some(start), Some(end)) = (starts_at, ends_at) {
            if end <= start {
                return Err(ElectionError::InvalidSchedule {
                    round: round.number,
                });
            }
        }
        round.starts_at = starts_at;
        round.ends_at = ends_at;
        Ok(())
    }

    /// Phase of the current round at `now`, with the time left in that phase.
    pub fn round_status(&self, now: DateTime<Utc>) -> RoundWindow {
        self.current_round().window(now)
    }

    /// Cast an anonymous vote for the candidate at `selection` in the current ballot.
    pub fn cast_vote(&mut self, selection: Option<usize>) -> Result<CandidateId> {
        self.cast_vote_at(selection, Utc::now())
    }

    pub fn cast_vote_at(
        &mut self,
        selection: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<CandidateId> {
        if self.options.require_registration {
            return Err(ElectionError::AnonymousBallot);
        }
        let index = self.check_selection(selection, now)?;
        self.rounds[self.current].record(index)
    }

    /// Cast a vote on behalf of an identified voter.
    pub fn cast_ballot(&mut self, voter: &str, selection: Option<usize>) -> Result<CandidateId> {
        self.cast_ballot_at(voter, selection, Utc::now())
    }

    pub fn cast_ballot_at(
        &mut self,
        voter: &str,
        selection: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<CandidateId> {
        if self.options.require_registration && !self.registry.contains(voter) {
            return Err(ElectionError::UnregisteredVoter(voter.to_string()));
        }
        let index = self.check_selection(selection, now)?;
        let round = &mut self.rounds[self.current];
        round.check_index(index)?;

        if self.options.one_ballot_per_voter && round.voters.contains(voter) {
            return Err(ElectionError::DuplicateVote {
                voter: voter.to_string(),
                round: round.number,
            });
        }

        round.voters.insert(voter.to_string());
        round.record(index)
    }

    fn check_selection(&self, selection: Option<usize>, now: DateTime<Utc>) -> Result<usize> {
        if self.is_terminal() {
            return Err(ElectionError::ElectionTerminal);
        }
        let round = self.current_round();
        match round.phase(now) {
            RoundPhase::Active => {}
            phase => {
                return Err(ElectionError::RoundNotActive {
                    round: round.number(),
                    phase,
                })
            }
        }
        selection.ok_or(ElectionError::InvalidSelection)
    }

    /// Close the current round, record who advances and open the next round
    /// unless the election is over.
    pub fn close_round(&mut self) -> Result<RoundResults> {
        if self.is_terminal() {
            return Err(ElectionError::ElectionTerminal);
        }

        let index = self.current;
        let round = &self.rounds[index];

        // Refuse or tie an empty round, per policy
        if round.total_votes() == 0 && self.options.empty_round == EmptyRoundPolicy::Reject {
            return Err(ElectionError::EmptyRound {
                round: round.number(),
            });
        }

        // Find leaders and, in runoff rounds, the second tier
        let votes: Vec<u64> = round.tallies().iter().map(|t| t.votes).collect();
        let qualification = tabulator::qualify(
            &votes,
            round.total_votes(),
            self.options.is_runoff_round(index),
            &self.options,
        );
        let winners: Vec<CandidateId> = qualification
            .qualifiers()
            .into_iter()
            .map(|position| round.tallies()[position].candidate)
            .collect();

        // Decide whether the election is over
        let completed = index + 1;
        self.outcome = if qualification.majority {
            Some(Outcome::Majority)
        } else if completed >= self.options.max_rounds {
            Some(Outcome::RoundBudget)
        } else if winners.len() == 1 {
            Some(Outcome::SingleCandidate)
        } else {
            None
        };

        // Freeze this round and open the next one with fresh counters
        let next = Round::open(completed + 1, winners.iter().copied());
        self.rounds[index].freeze(winners, qualification.majority);

        if self.outcome.is_none() {
            self.rounds.push(next);
            self.current = completed;
        }

        self.round_results(index)
    }

    /// Frozen tally and winners of the closed round at `index` (zero-based).
    pub fn round_results(&self, index: usize) -> Result<RoundResults> {
        let round = self
            .rounds
            .get(index)
            .ok_or(ElectionError::UnknownRound { round: index + 1 })?;
        let winners = round
            .winners()
            .ok_or(ElectionError::RoundStillOpen {
                round: round.number(),
            })?;

        let candidates: Vec<CandidateResult> = round
            .tallies()
            .iter()
            .map(|t| self.candidate_result(t, round.total_votes()))
            .collect();
        let winners = winners
            .iter()
            .filter_map(|id| candidates.iter().find(|c| c.id == *id).cloned())
            .collect();

        Ok(RoundResults {
            round: round.number(),
            candidates,
            total_votes: round.total_votes(),
            winners,
            majority: round.majority(),
            opened_at: round.opened_at(),
            closed_at: round.closed_at(),
            starts_at: round.starts_at(),
            ends_at: round.ends_at(),
        })
    }

    /// Results of every closed round, oldest first.
    pub fn history(&self) -> Vec<RoundResults> {
        (0..self.rounds.len())
            .filter_map(|index| self.round_results(index).ok())
            .collect()
    }

    fn candidate_result(&self, tally: &Tally, total_votes: u64) -> CandidateResult {
        let name = self
            .candidate(tally.candidate)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let share = if total_votes > 0 {
            tally.votes as f64 * 100.0 / total_votes as f64
        } else {
            0.0
        };
        CandidateResult {
            id: tally.candidate,
            name,
            votes: tally.votes,
            share,
        }
    }
}
