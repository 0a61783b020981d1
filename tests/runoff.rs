use runoff_election::formats::Scenario;
use runoff_election::model::{ElectionStatus, Outcome};
use runoff_election::reports::generate_report;
use runoff_election::tabulator::EmptyRoundPolicy;
use runoff_election::{Election, ElectionError, TabulationOptions};

const SAMPLE: [&str; 10] = [
    "Jean Dupont",
    "Marie Curie",
    "Albert Einstein",
    "Isaac Newton",
    "Galileo Galilei",
    "Charles Darwin",
    "Stephen Hawking",
    "Nikola Tesla",
    "Ada Lovelace",
    "Alan Turing",
];

fn cast(election: &mut Election, votes: &[u64]) {
    for (index, count) in votes.iter().enumerate() {
        for _ in 0..*count {
            election.cast_vote(Some(index)).unwrap();
            assert!(election.current_round().is_consistent());
        }
    }
}

fn ballot_names(election: &Election) -> Vec<String> {
    election.ballot().into_iter().map(|c| c.name.clone()).collect()
}

#[test]
fn sample_election_runs_to_a_winner() {
    let mut election = Election::new(SAMPLE).unwrap();
    cast(&mut election, &[3, 2, 1, 0, 1, 1, 1, 1, 0, 0]);

    let first = election.close_round().unwrap();
    assert_eq!(first.round, 1);
    assert_eq!(first.total_votes, 10);
    assert_eq!(ballot_names(&election), vec!["Jean Dupont", "Marie Curie"]);

    cast(&mut election, &[4, 6]);
    let second = election.close_round().unwrap();
    assert!(second.majority);

    assert_eq!(election.status(), ElectionStatus::Terminal(Outcome::Majority));
    assert_eq!(
        election.winner().map(|c| c.name.as_str()),
        Some("Marie Curie")
    );
    assert_eq!(election.history().len(), 2);
    assert_eq!(election.round_results(0).unwrap(), first);
}

#[test]
fn runoff_can_widen_in_second_round() {
    let mut election = Election::new(["A", "B", "C", "D"]).unwrap();
    cast(&mut election, &[4, 1, 1, 1]);
    election.close_round().unwrap();
    assert_eq!(election.current_round().candidate_count(), 4);

    cast(&mut election, &[3, 2, 2, 0]);
    election.close_round().unwrap();
    assert_eq!(ballot_names(&election), vec!["A", "B", "C"]);

    cast(&mut election, &[2, 2, 1]);
    let last = election.close_round().unwrap();
    assert_eq!(last.round, 3);
    assert_eq!(last.winners.len(), 2);
    assert_eq!(election.outcome(), Some(Outcome::RoundBudget));
    assert!(election.winner().is_none());
    assert_eq!(
        election.cast_vote(Some(0)),
        Err(ElectionError::ElectionTerminal)
    );
}

#[test]
fn third_round_never_draws_a_second_tier() {
    let mut election = Election::new(["A", "B", "C"]).unwrap();
    cast(&mut election, &[1, 1, 1]);
    election.close_round().unwrap();
    cast(&mut election, &[1, 1, 1]);
    election.close_round().unwrap();
    cast(&mut election, &[2, 1, 1]);
    let last = election.close_round().unwrap();

    assert_eq!(last.winners.len(), 1);
    assert!(!last.majority);
    assert_eq!(election.outcome(), Some(Outcome::RoundBudget));
    assert_eq!(election.winner().map(|c| c.name.as_str()), Some("A"));
}

#[test]
fn shorter_budget_is_honoured() {
    let options = TabulationOptions {
        max_rounds: 2,
        runoff_rounds: 1,
        ..TabulationOptions::default()
    };
    let mut election = Election::with_options(["A", "B", "C"], options).unwrap();
    cast(&mut election, &[2, 1, 1]);
    election.close_round().unwrap();
    assert_eq!(election.current_round().candidate_count(), 3);

    cast(&mut election, &[1, 1, 0]);
    election.close_round().unwrap();
    assert_eq!(election.outcome(), Some(Outcome::RoundBudget));
    assert_eq!(election.rounds().len(), 2);
}

#[test]
fn zero_vote_policy_is_configurable() {
    let mut strict = Election::new(["A", "B"]).unwrap();
    assert_eq!(
        strict.close_round(),
        Err(ElectionError::EmptyRound { round: 1 })
    );

    let lenient = TabulationOptions {
        empty_round: EmptyRoundPolicy::NoMajority,
        ..TabulationOptions::default()
    };
    let mut election = Election::with_options(["A", "B"], lenient).unwrap();
    let results = election.close_round().unwrap();
    assert_eq!(results.winners.len(), 2);
    assert_eq!(election.status(), ElectionStatus::RoundOpen(2));
}

#[test]
fn scenario_report_matches_engine() {
    let scenario: Scenario = serde_json::from_str(
        r#"{
            "name": "Club president",
            "candidates": ["Ada", "Alan", "Grace"],
            "rounds": [
                [0, 0, 1, 1, 2],
                [{"voter": "v1", "candidate": 0}, {"voter": "v2", "candidate": 0}]
            ]
        }"#,
    )
    .unwrap();

    let run = scenario.run().unwrap();
    let report = generate_report(&scenario.name, &run.election);

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].eliminated, vec!["Grace"]);
    assert_eq!(report.summary.winner.as_deref(), Some("Ada"));
    assert_eq!(report.summary.total_rounds, 2);
}
