use super::{CandidateInfo, ElectionInfo, ElectionReport, ResultSummary, RoundReport};
use crate::model::{Election, ElectionStatus, RoundResults};
use chrono::Utc;

/// Build a report covering every closed round of `election`
pub fn generate_report(name: &str, election: &Election) -> ElectionReport {
    let info = ElectionInfo {
        name: name.to_string(),
        options: election.options().clone(),
        generated_at: Utc::now().to_rfc3339(),
    };

    let candidates = election
        .candidates()
        .iter()
        .map(|c| CandidateInfo {
            id: c.id.0,
            name: c.name.clone(),
        })
        .collect();

    let history = election.history();
    let results: Vec<RoundReport> = history.iter().map(round_report).collect();

    let open_round = match election.status() {
        ElectionStatus::RoundOpen(round) => Some(round),
        ElectionStatus::Terminal(_) => None,
    };

    let summary = ResultSummary {
        winner: election.winner().map(|c| c.name.clone()),
        finalists: election
            .finalists()
            .into_iter()
            .map(|c| c.name.clone())
            .collect(),
        outcome: election.outcome().map(|o| o.to_string()),
        total_rounds: results.len(),
        open_round,
    };

    ElectionReport {
        info,
        candidates,
        results,
        summary,
    }
}

fn round_report(results: &RoundResults) -> RoundReport {
    let tally = results
        .candidates
        .iter()
        .map(|c| (c.name.clone(), c.votes))
        .collect();

    let winners: Vec<String> = results.winners.iter().map(|c| c.name.clone()).collect();
    let eliminated = results
        .candidates
        .iter()
        .filter(|c| !results.winners.iter().any(|w| w.id == c.id))
        .map(|c| c.name.clone())
        .collect();

    RoundReport {
        round: results.round,
        tally,
        total_votes: results.total_votes,
        winners,
        eliminated,
        majority: results.majority,
        closed_at: results.closed_at.map(|t| t.to_rfc3339()),
    }
}
