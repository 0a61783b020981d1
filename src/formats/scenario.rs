//! JSON scenario files: a candidate roster, tabulation options and the
//! ballots cast in each round.
//!
//! ```json
//! {
//!   "name": "Student council",
//!   "candidates": ["Jean Dupont", "Marie Curie", "Albert Einstein"],
//!   "options": { "maxRounds": 3 },
//!   "voters": ["v1", "v2"],
//!   "rounds": [
//!     [0, 0, 1, 2],
//!     [{ "voter": "v1", "candidate": 0 }, { "voter": "v2", "candidate": 1 }]
//!   ]
//! }
//! ```
//!
//! Candidate indexes refer to the ballot of the round they are cast in, not
//! to the roster.

use super::{FormatError, Result};
use crate::model::{CandidateId, Election};
use crate::tabulator::TabulationOptions;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub candidates: Vec<String>,
    #[serde(default)]
    pub options: TabulationOptions,
    /// Voter register, consulted when `requireRegistration` is set.
    #[serde(default)]
    pub voters: Vec<String>,
    #[serde(default)]
    pub rounds: Vec<Vec<BallotEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BallotEntry {
    Anonymous(usize),
    Identified { voter: String, candidate: usize },
}

impl BallotEntry {
    fn cast(&self, election: &mut Election) -> crate::model::Result<CandidateId> {
        match self {
            BallotEntry::Anonymous(index) => election.cast_vote(Some(*index)),
            BallotEntry::Identified { voter, candidate } => {
                election.cast_ballot(voter, Some(*candidate))
            }
        }
    }
}

/// An election after replaying a scenario.
#[derive(Debug)]
pub struct ScenarioRun {
    pub election: Election,
    pub rounds_played: usize,
    /// Scenario rounds left over once the election was already decided.
    pub ignored_rounds: usize,
}

pub fn read_scenario(path: &Path) -> Result<Scenario> {
    let reader = BufReader::new(File::open(path)?);
    let scenario = serde_json::from_reader(reader)?;
    Ok(scenario)
}

impl Scenario {
    pub fn election(&self) -> Result<Election> {
        let mut election =
            Election::with_options(self.candidates.iter().cloned(), self.options.clone())?;
        for voter in &self.voters {
            election.register_voter(voter)?;
        }
        Ok(election)
    }

    /// Cast every round's ballots and close the round, until the scenario or
    /// the election runs out of rounds.
    pub fn run(&self) -> Result<ScenarioRun> {
        let mut election = self.election()?;
        let mut rounds_played = 0;
        let mut ignored_rounds = 0;

        for (round_index, ballots) in self.rounds.iter().enumerate() {
            if election.is_terminal() {
                ignored_rounds += 1;
                continue;
            }

            for (ballot_index, entry) in ballots.iter().enumerate() {
                entry
                    .cast(&mut election)
                    .map_err(|source| FormatError::Ballot {
                        round: round_index + 1,
                        ballot: ballot_index + 1,
                        source,
                    })?;
            }

            election.close_round()?;
            rounds_played += 1;
        }

        Ok(ScenarioRun {
            election,
            rounds_played,
            ignored_rounds,
        })
    }

    /// Cap the round budget, lowering the runoff rounds so they still fit.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Scenario {
        self.options.max_rounds = max_rounds;
        self.options.runoff_rounds = self.options.runoff_rounds.min(max_rounds);
        self
    }

    pub fn ballot_count(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }
}
