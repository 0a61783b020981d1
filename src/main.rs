use clap::{Parser, Subcommand};
use runoff_election::commands::{info, session, simulate};
use std::path::PathBuf;

#[derive(Parser)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate and dump info about a scenario.
    Info {
        /// Scenario file (JSON).
        scenario: PathBuf,
    },
    /// Replay a scenario round by round and print the results.
    Simulate {
        /// Scenario file (JSON).
        scenario: PathBuf,
        /// Write the JSON report here.
        #[clap(long)]
        report: Option<PathBuf>,
        /// Override the scenario's round budget.
        #[clap(long)]
        max_rounds: Option<usize>,
    },
    /// Run an election driven by a command script.
    Session {
        /// Candidate names, in ballot order.
        #[clap(required = true)]
        candidates: Vec<String>,
        /// Script file; commands are read from stdin when omitted.
        #[clap(long)]
        script: Option<PathBuf>,
    },
}

fn main() {
    let opts = Opts::parse();

    let result = match opts.command {
        Command::Info { scenario } => info(&scenario),
        Command::Simulate {
            scenario,
            report,
            max_rounds,
        } => simulate(&scenario, report.as_deref(), max_rounds),
        Command::Session { candidates, script } => session(&candidates, script.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
