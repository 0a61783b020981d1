pub mod scenario;

pub use scenario::{read_scenario, BallotEntry, Scenario, ScenarioRun};

use crate::model::ElectionError;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Election error: {0}")]
    Election(#[from] ElectionError),
    #[error("Ballot {ballot} of round {round} rejected: {source}")]
    Ballot {
        round: usize,
        ballot: usize,
        source: ElectionError,
    },
}

pub type Result<T> = std::result::Result<T, FormatError>;
