//! Runoff qualification rule and the options that parameterize it.

use crate::model::{ElectionError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// What to do when a round is closed before anyone voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyRoundPolicy {
    /// Refuse to close the round.
    Reject,
    /// Close it as a round without majority: every candidate ties at zero.
    NoMajority,
}

/// Tabulation options for a runoff election
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabulationOptions {
    /// Maximum number of rounds, including the first.
    pub max_rounds: usize,
    /// Rounds (counted from the first) whose closure may qualify a second tier.
    pub runoff_rounds: usize,
    /// A leader wins outright with a vote share strictly above this.
    pub majority_threshold: f64,
    pub empty_round: EmptyRoundPolicy,
    pub one_ballot_per_voter: bool,
    /// Only registered voters may cast ballots; anonymous votes are refused.
    pub require_registration: bool,
}

impl Default for TabulationOptions {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            runoff_rounds: 2,
            majority_threshold: 0.5,
            empty_round: EmptyRoundPolicy::Reject,
            one_ballot_per_voter: true,
            require_registration: false,
        }
    }
}

impl TabulationOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(ElectionError::InvalidOptions(
                "maxRounds must be at least 1".to_string(),
            ));
        }
        if self.runoff_rounds > self.max_rounds {
            return Err(ElectionError::InvalidOptions(format!(
                "runoffRounds ({}) exceeds maxRounds ({})",
                self.runoff_rounds, self.max_rounds
            )));
        }
        if !(0.5..1.0).contains(&self.majority_threshold) {
            return Err(ElectionError::InvalidOptions(format!(
                "majorityThreshold {} is outside [0.5, 1.0)",
                self.majority_threshold
            )));
        }
        Ok(())
    }

    /// Whether closing the round at `round_index` (zero-based) may add a second tier.
    pub fn is_runoff_round(&self, round_index: usize) -> bool {
        round_index < self.runoff_rounds
    }
}

/// Which positions of a round's tally advance, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualification {
    pub max_votes: u64,
    pub majority: bool,
    /// Positions tied at `max_votes`, in ballot order.
    pub leaders: Vec<usize>,
    /// Positions tied at the next-highest count, when a second tier was drawn.
    pub runoff_tier: Vec<usize>,
}

impl Qualification {
    /// Leaders followed by the runoff tier.
    pub fn qualifiers(&self) -> Vec<usize> {
        self.leaders
            .iter()
            .chain(self.runoff_tier.iter())
            .copied()
            .collect()
    }
}

/// Decide who advances from a round given its per-candidate `votes`.
///
/// Ties are never broken: every candidate at the top count advances. A second
/// tier is drawn only when `runoff_eligible`, no majority exists and a single
/// candidate leads; all candidates at the next-highest count join it.
pub fn qualify(
    votes: &[u64],
    total_votes: u64,
    runoff_eligible: bool,
    options: &TabulationOptions,
) -> Qualification {
    let max_votes = votes.iter().copied().max().unwrap_or(0);
    let majority =
        total_votes > 0 && max_votes as f64 > options.majority_threshold * total_votes as f64;

    let leaders: Vec<usize> = votes.iter().positions(|&v| v == max_votes).collect();

    let runoff_tier = if runoff_eligible && !majority && leaders.len() < 2 {
        match votes.iter().copied().filter(|&v| v < max_votes).max() {
            Some(second_max) => votes.iter().positions(|&v| v == second_max).collect(),
            None => Vec::new(),
        }
    } else {
        Vec::new()
    };

    Qualification {
        max_votes,
        majority,
        leaders,
        runoff_tier,
    }
}
