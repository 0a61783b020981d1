pub mod election;
pub mod selection;

pub use election::{
    Candidate, CandidateId, CandidateResult, Election, ElectionStatus, Outcome, Round,
    RoundPhase, RoundResults, RoundWindow, Tally,
};
pub use selection::Selection;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ElectionError {
    #[error("No candidate selected")]
    InvalidSelection,
    #[error("Candidate index {index} is out of range for a round of {len} candidates")]
    CandidateOutOfRange { index: usize, len: usize },
    #[error("Voter {voter} already voted in round {round}")]
    DuplicateVote { voter: String, round: usize },
    #[error("Round {round} cannot be closed before any vote is cast")]
    EmptyRound { round: usize },
    #[error("The election is over")]
    ElectionTerminal,
    #[error("Round {round} does not exist")]
    UnknownRound { round: usize },
    #[error("Round {round} is still open")]
    RoundStillOpen { round: usize },
    #[error("Round {round} is not accepting ballots: {phase}")]
    RoundNotActive { round: usize, phase: RoundPhase },
    #[error("Round {round} cannot end before it starts")]
    InvalidSchedule { round: usize },
    #[error("Voter {0} is not registered")]
    UnregisteredVoter(String),
    #[error("Voter {0} is already registered")]
    VoterAlreadyRegistered(String),
    #[error("Voter ids cannot be blank")]
    InvalidVoterId,
    #[error("Anonymous ballots are not accepted when voters must register")]
    AnonymousBallot,
    #[error("An election needs at least one candidate")]
    NoCandidates,
    #[error("Candidate names cannot be blank")]
    InvalidCandidateName,
    #[error("Candidate registered twice: {0}")]
    DuplicateCandidate(String),
    #[error("Invalid tabulation options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, ElectionError>;
