use crate::tabulator::TabulationOptions;
use crate::util::write_serialized;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub mod generator;

pub use generator::generate_report;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Full election report, one entry per closed round
#[derive(Debug, Serialize, Deserialize)]
pub struct ElectionReport {
    pub info: ElectionInfo,
    pub candidates: Vec<CandidateInfo>,
    pub results: Vec<RoundReport>,
    pub summary: ResultSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ElectionInfo {
    pub name: String,
    pub options: TabulationOptions,
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: usize,
    pub tally: BTreeMap<String, u64>,
    #[serde(rename = "totalVotes")]
    pub total_votes: u64,
    pub winners: Vec<String>,
    pub eliminated: Vec<String>,
    pub majority: bool,
    #[serde(rename = "closedAt")]
    pub closed_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultSummary {
    pub winner: Option<String>,
    pub finalists: Vec<String>,
    pub outcome: Option<String>,
    #[serde(rename = "totalRounds")]
    pub total_rounds: usize,
    #[serde(rename = "openRound")]
    pub open_round: Option<usize>,
}

impl ElectionReport {
    pub fn write(&self, path: &Path) -> ReportResult<()> {
        write_serialized(path, self)?;
        Ok(())
    }
}
