use crate::formats::read_scenario;
use colored::*;
use std::path::Path;

/// Validate and dump a scenario without playing it.
pub fn info(scenario_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = read_scenario(scenario_path)?;
    let election = scenario.election()?;

    println!("🗳️  {}", scenario.name.bright_cyan().bold());
    println!("👥 Candidates:");
    for candidate in election.candidates() {
        println!("    {} {}", candidate.id.to_string().dimmed(), candidate.name);
    }

    let options = election.options();
    println!(
        "⚙️  Up to {} rounds, runoff tier in the first {}, majority above {:.0} %",
        options.max_rounds,
        options.runoff_rounds,
        options.majority_threshold * 100.0
    );

    for (index, ballots) in scenario.rounds.iter().enumerate() {
        println!(
            "  📋 Round {}: {} ballots",
            index + 1,
            ballots.len().to_string().bright_yellow()
        );
    }
    println!(
        "✅ {} ballots across {} rounds",
        scenario.ballot_count().to_string().bright_green(),
        scenario.rounds.len()
    );

    Ok(())
}
