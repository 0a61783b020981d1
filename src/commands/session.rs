use super::{print_round, print_status};
use crate::model::{CandidateId, Election, ElectionError, ElectionStatus, RoundResults, Selection};
use colored::*;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Invalid argument for {command}: {argument}")]
    InvalidArgument { command: String, argument: String },
    #[error("{0}")]
    Election(#[from] ElectionError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One line of a session script. Positions and round numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select(usize),
    Confirm(Option<String>),
    Close,
    Results(Option<usize>),
    Status,
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Selected(Option<usize>),
    Voted(CandidateId),
    Closed(RoundResults),
    Results(RoundResults),
    Status(ElectionStatus),
    History(Vec<RoundResults>),
}

/// Parse a script line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, SessionError> {
    lazy_static! {
        static ref COMMAND_RX: Regex = Regex::new(r"^(\w+)(?:\s+(\S+))?$").unwrap();
    }

    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let caps = COMMAND_RX
        .captures(line)
        .ok_or_else(|| SessionError::UnknownCommand(line.to_string()))?;
    let command = caps[1].to_lowercase();
    let argument = caps.get(2).map(|m| m.as_str());

    let invalid = |argument: &str| SessionError::InvalidArgument {
        command: command.clone(),
        argument: argument.to_string(),
    };
    let position = |argument: &str| match argument.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(invalid(argument)),
    };

    let parsed = match (command.as_str(), argument) {
        ("select", Some(arg)) => SessionCommand::Select(position(arg)?),
        ("select", None) => return Err(invalid("")),
        ("confirm", voter) => SessionCommand::Confirm(voter.map(str::to_string)),
        ("results", Some(arg)) => SessionCommand::Results(Some(position(arg)?)),
        ("results", None) => SessionCommand::Results(None),
        ("close", None) => SessionCommand::Close,
        ("status", None) => SessionCommand::Status,
        ("history", None) => SessionCommand::History,
        ("close" | "status" | "history", Some(arg)) => return Err(invalid(arg)),
        _ => return Err(SessionError::UnknownCommand(line.to_string())),
    };

    Ok(Some(parsed))
}

/// An election plus the ballot being filled in.
pub struct Session {
    election: Election,
    selection: Selection,
}

impl Session {
    pub fn new(election: Election) -> Session {
        Session {
            election,
            selection: Selection::new(),
        }
    }

    pub fn election(&self) -> &Election {
        &self.election
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection.selected()
    }

    pub fn apply(&mut self, command: SessionCommand) -> Result<SessionEvent, SessionError> {
        match command {
            SessionCommand::Select(position) => {
                if self.election.is_terminal() {
                    return Err(ElectionError::ElectionTerminal.into());
                }
                let len = self.election.current_round().candidate_count();
                let index = position
                    .checked_sub(1)
                    .filter(|index| *index < len)
                    .ok_or(ElectionError::CandidateOutOfRange {
                        index: position.saturating_sub(1),
                        len,
                    })?;
                Ok(SessionEvent::Selected(self.selection.toggle(index)))
            }
            SessionCommand::Confirm(voter) => {
                let selected = self.selection.selected();
                let candidate = match voter {
                    Some(voter) => self.election.cast_ballot(&voter, selected)?,
                    None => self.election.cast_vote(selected)?,
                };
                self.selection.clear();
                Ok(SessionEvent::Voted(candidate))
            }
            SessionCommand::Close => {
                let results = self.election.close_round()?;
                self.selection.clear();
                Ok(SessionEvent::Closed(results))
            }
            SessionCommand::Results(Some(round)) => {
                let index = round
                    .checked_sub(1)
                    .ok_or(ElectionError::UnknownRound { round })?;
                Ok(SessionEvent::Results(self.election.round_results(index)?))
            }
            SessionCommand::Results(None) => {
                let last = self.election.history().pop().ok_or(
                    ElectionError::RoundStillOpen {
                        round: self.election.current_round().number(),
                    },
                )?;
                Ok(SessionEvent::Results(last))
            }
            SessionCommand::Status => Ok(SessionEvent::Status(self.election.status())),
            SessionCommand::History => Ok(SessionEvent::History(self.election.history())),
        }
    }

    fn print_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Selected(Some(index)) => {
                let name = self
                    .election
                    .ballot()
                    .get(*index)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                println!("☑️  Selected {}", name.bright_cyan());
            }
            SessionEvent::Selected(None) => println!("⬜ Selection cleared"),
            SessionEvent::Voted(id) => {
                let name = self
                    .election
                    .candidate(*id)
                    .map(|c| c.name.as_str())
                    .unwrap_or_default();
                println!("✅ Vote recorded for {}", name.bright_green());
            }
            SessionEvent::Closed(results) => {
                print_round(results);
                print_status(&self.election);
            }
            SessionEvent::Results(results) => print_round(results),
            SessionEvent::Status(_) => print_status(&self.election),
            SessionEvent::History(history) => {
                if history.is_empty() {
                    println!("📭 No round closed yet");
                }
                for results in history {
                    print_round(results);
                }
            }
        }
    }
}

/// Run a session script against a fresh election of `candidates`.
///
/// Reads from stdin when no script is given. Failing lines are reported and
/// skipped.
pub fn session(
    candidates: &[String],
    script: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let election = Election::new(candidates.iter().cloned())?;
    let mut session = Session::new(election);

    println!(
        "🚀 Starting session with {} candidates",
        candidates.len().to_string().bright_yellow()
    );
    print_status(session.election());

    let reader: Box<dyn BufRead> = match script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut failures = 0usize;
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let outcome = parse_command(&line).and_then(|command| match command {
            Some(command) => session.apply(command).map(Some),
            None => Ok(None),
        });

        match outcome {
            Ok(Some(event)) => session.print_event(&event),
            Ok(None) => {}
            Err(e) => {
                failures += 1;
                eprintln!("❌ Line {}: {}", number + 1, e.to_string().red());
            }
        }
    }

    if failures > 0 {
        eprintln!("⚠️  {} line(s) failed", failures);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, script: &str) -> Vec<SessionEvent> {
        script
            .lines()
            .filter_map(|line| parse_command(line).unwrap())
            .map(|command| session.apply(command).unwrap())
            .collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("select 3").unwrap(),
            Some(SessionCommand::Select(3))
        );
        assert_eq!(
            parse_command("  CONFIRM alice ").unwrap(),
            Some(SessionCommand::Confirm(Some("alice".to_string())))
        );
        assert_eq!(
            parse_command("confirm").unwrap(),
            Some(SessionCommand::Confirm(None))
        );
        assert_eq!(
            parse_command("results").unwrap(),
            Some(SessionCommand::Results(None))
        );
        assert_eq!(parse_command("close").unwrap(), Some(SessionCommand::Close));
        assert_eq!(parse_command("# comment").unwrap(), None);
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(matches!(
            parse_command("select 0"),
            Err(SessionError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_command("select"),
            Err(SessionError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_command("close now"),
            Err(SessionError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_command("vote 1"),
            Err(SessionError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse_command("select 1 2"),
            Err(SessionError::UnknownCommand(_))
        ));
    }

    #[test]
    fn select_toggles() {
        let mut session = Session::new(Election::new(["A", "B"]).unwrap());
        let events = run(&mut session, "select 2\nselect 2\nselect 1");
        assert_eq!(
            events,
            vec![
                SessionEvent::Selected(Some(1)),
                SessionEvent::Selected(None),
                SessionEvent::Selected(Some(0)),
            ]
        );
        assert_eq!(session.selection(), Some(0));
    }

    #[test]
    fn confirm_without_selection_fails() {
        let mut session = Session::new(Election::new(["A", "B"]).unwrap());
        assert!(matches!(
            session.apply(SessionCommand::Confirm(None)),
            Err(SessionError::Election(ElectionError::InvalidSelection))
        ));
    }

    #[test]
    fn select_past_ballot_fails() {
        let mut session = Session::new(Election::new(["A", "B"]).unwrap());
        assert!(matches!(
            session.apply(SessionCommand::Select(3)),
            Err(SessionError::Election(
                ElectionError::CandidateOutOfRange { index: 2, len: 2 }
            ))
        ));
    }

    #[test]
    fn script_plays_a_runoff() {
        let mut session = Session::new(Election::new(["A", "B", "C"]).unwrap());
        let script = "
            select 1
            confirm v1
            select 1
            confirm v2
            select 2
            confirm v3
            select 2
            confirm v4
            select 3
            confirm v5
            close
            select 2
            confirm v1
            select 2
            confirm v2
            select 1
            confirm v3
            close
        ";
        let events = run(&mut session, script);

        let closed: Vec<&RoundResults> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Closed(results) => Some(results),
                _ => None,
            })
            .collect();
        assert_eq!(closed.len(), 2);
        assert_eq!(closed[0].winners.len(), 2);
        assert!(closed[1].majority);
        assert_eq!(
            session.election().winner().map(|c| c.name.as_str()),
            Some("B")
        );
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn double_confirm_by_same_voter_fails() {
        let mut session = Session::new(Election::new(["A", "B"]).unwrap());
        run(&mut session, "select 1\nconfirm v1\nselect 2");
        assert!(matches!(
            session.apply(SessionCommand::Confirm(Some("v1".to_string()))),
            Err(SessionError::Election(ElectionError::DuplicateVote { .. }))
        ));
        assert_eq!(session.selection(), Some(1));
    }

    #[test]
    fn results_default_to_last_closed_round() {
        let mut session = Session::new(Election::new(["A", "B", "C"]).unwrap());
        assert!(matches!(
            session.apply(SessionCommand::Results(None)),
            Err(SessionError::Election(ElectionError::RoundStillOpen { round: 1 }))
        ));

        run(&mut session, "select 1\nconfirm\nselect 2\nconfirm\nclose");
        match session.apply(SessionCommand::Results(None)).unwrap() {
            SessionEvent::Results(results) => assert_eq!(results.round, 1),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(
            session.apply(SessionCommand::Status).unwrap(),
            SessionEvent::Status(ElectionStatus::RoundOpen(2))
        );
    }

    #[test]
    fn results_errors_name_the_round() {
        let mut session = Session::new(Election::new(["A", "B", "C"]).unwrap());
        run(&mut session, "select 1\nconfirm\nselect 2\nconfirm\nclose");

        let message = |command: SessionCommand, session: &mut Session| {
            session.apply(command).unwrap_err().to_string()
        };
        assert_eq!(
            message(SessionCommand::Results(Some(2)), &mut session),
            "Round 2 is still open"
        );
        assert_eq!(
            message(SessionCommand::Results(Some(3)), &mut session),
            "Round 3 does not exist"
        );

        let mut fresh = Session::new(Election::new(["A", "B"]).unwrap());
        assert_eq!(
            message(SessionCommand::Results(None), &mut fresh),
            "Round 1 is still open"
        );
    }
}
