mod info;
mod session;
mod simulate;

pub use info::info;
pub use session::{parse_command, session, Session, SessionCommand, SessionError, SessionEvent};
pub use simulate::simulate;

use crate::model::{Election, ElectionStatus, RoundResults};
use colored::*;

pub(crate) fn print_round(results: &RoundResults) {
    println!(
        "📊 Round {}: {} votes{}",
        results.round.to_string().bright_cyan(),
        results.total_votes.to_string().bright_yellow(),
        if results.majority {
            " (majority)".bright_green().to_string()
        } else {
            String::new()
        }
    );

    for candidate in &results.candidates {
        let advanced = results.winners.iter().any(|w| w.id == candidate.id);
        let line = format!(
            "    {:<24} {:>6} {:>4} %",
            candidate.name,
            candidate.votes,
            candidate.percentage()
        );
        if advanced {
            println!("{}", line.green());
        } else {
            println!("{}", line.dimmed());
        }
    }
}

pub(crate) fn print_status(election: &Election) {
    match election.status() {
        ElectionStatus::RoundOpen(round) => {
            println!("🗳️  Round {} is open:", round.to_string().bright_cyan());
            for (index, candidate) in election.ballot().iter().enumerate() {
                println!("    {}. {}", index + 1, candidate.name);
            }
        }
        ElectionStatus::Terminal(outcome) => match election.winner() {
            Some(winner) => println!(
                "🏆 Winner: {} ({})",
                winner.name.bright_green().bold(),
                outcome
            ),
            None => {
                let finalists: Vec<&str> = election
                    .finalists()
                    .into_iter()
                    .map(|c| c.name.as_str())
                    .collect();
                println!(
                    "🏁 Election over ({}), no single winner: {}",
                    outcome,
                    finalists.join(", ").bright_yellow()
                );
            }
        },
    }
}
