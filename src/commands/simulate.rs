use super::{print_round, print_status};
use crate::formats::read_scenario;
use crate::reports::generate_report;
use colored::*;
use std::path::Path;

pub fn simulate(
    scenario_path: &Path,
    report_path: Option<&Path>,
    max_rounds: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = read_scenario(scenario_path)?;
    if let Some(max_rounds) = max_rounds {
        scenario = scenario.with_max_rounds(max_rounds);
    }

    println!(
        "🚀 Simulating {} with {} candidates",
        scenario.name.bright_cyan(),
        scenario.candidates.len().to_string().bright_yellow()
    );

    let run = scenario.run()?;
    for results in run.election.history() {
        print_round(&results);
    }

    if run.ignored_rounds > 0 {
        eprintln!(
            "⚠️  Ignored {} scenario round(s) after the election was decided",
            run.ignored_rounds
        );
    }

    print_status(&run.election);

    if let Some(report_path) = report_path {
        let report = generate_report(&scenario.name, &run.election);
        report.write(report_path)?;
        println!(
            "✅ Report written: {}",
            report_path.display().to_string().bright_green()
        );
    }

    Ok(())
}
