//! Command parsing for scripts and timelines

use crate::config::SimConfig;
use crate::error::SimError;
use crate::types::Tick;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One parsed rotation command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Idle for a relative number of seconds
    Wait(f64),
    /// Idle until an absolute time (measured against the global tick)
    WaitUntil(f64),
    /// Nth hit of the normal chain, zero-based
    Normal(usize),
    Skill,
    Ult,
    Qte,
}

/// One timeline row at the boundary: `{start_time, command}` in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub start_time: f64,
    pub command: String,
}

/// Parse one command word (no waits). `attack` normalizes to `a1`.
fn parse_action_word(word: &str) -> Option<Command> {
    let word = word.trim().to_ascii_lowercase();
    match word.as_str() {
        "attack" => return Some(Command::Normal(0)),
        "skill" | "e" => return Some(Command::Skill),
        "ult" | "q" => return Some(Command::Ult),
        "qte" => return Some(Command::Qte),
        _ => {}
    }
    if let Some(rest) = word.strip_prefix('a') {
        if let Ok(n) = rest.parse::<usize>() {
            if n >= 1 {
                return Some(Command::Normal(n - 1));
            }
        }
    }
    None
}

/// Parse a newline-delimited script. Unknown words are skipped with a
/// warning; a `wait`/`wait_until` with a malformed number is an error.
pub fn parse_script(text: &str) -> Result<Vec<Command>, SimError> {
    let mut commands = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let head = parts.next().unwrap_or_default().to_ascii_lowercase();
        match head.as_str() {
            "wait" | "wait_until" => {
                let arg = parts.next().ok_or_else(|| {
                    SimError::InvalidInput(format!("`{head}` needs a seconds argument"))
                })?;
                let seconds: f64 = arg.parse().map_err(|_| {
                    SimError::InvalidInput(format!("`{head} {arg}`: not a number"))
                })?;
                commands.push(if head == "wait" {
                    Command::Wait(seconds)
                } else {
                    Command::WaitUntil(seconds)
                });
            }
            _ => match parse_action_word(&head) {
                Some(command) => commands.push(command),
                None => warn!(word = %head, "skipping unrecognized script command"),
            },
        }
    }
    Ok(commands)
}

/// Parse timeline rows into `(start_tick, command)` pairs. Waits are implicit
/// from the timestamps, so explicit `wait` rows are dropped; an entry whose
/// command is not a known action word is an error.
pub fn parse_timeline(
    config: &SimConfig,
    entries: &[TimelineEntry],
) -> Result<Vec<(Tick, Command)>, SimError> {
    let mut commands = Vec::new();
    for entry in entries {
        let word = entry.command.trim().to_ascii_lowercase();
        if word.contains("wait") {
            continue;
        }
        if !entry.start_time.is_finite() || entry.start_time < 0.0 {
            return Err(SimError::InvalidInput(format!(
                "timeline start_time {} is not a non-negative number",
                entry.start_time
            )));
        }
        let command = parse_action_word(&word).ok_or_else(|| {
            SimError::InvalidInput(format!("timeline entry `{}` is not a known command", entry.command))
        })?;
        commands.push((config.ticks(entry.start_time), command));
    }
    commands.sort_by_key(|(tick, _)| *tick);
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_basics() {
        let commands = parse_script("a1\na2\nwait 1.5\nskill\nult\nqte\nwait_until 12").unwrap();
        assert_eq!(
            commands,
            vec![
                Command::Normal(0),
                Command::Normal(1),
                Command::Wait(1.5),
                Command::Skill,
                Command::Ult,
                Command::Qte,
                Command::WaitUntil(12.0),
            ]
        );
    }

    #[test]
    fn test_parse_script_aliases() {
        let commands = parse_script("e\nq\nattack").unwrap();
        assert_eq!(commands, vec![Command::Skill, Command::Ult, Command::Normal(0)]);
    }

    #[test]
    fn test_unknown_words_skipped() {
        let commands = parse_script("a1\ndance\nskill").unwrap();
        assert_eq!(commands, vec![Command::Normal(0), Command::Skill]);
    }

    #[test]
    fn test_malformed_wait_is_error() {
        assert!(parse_script("wait abc").is_err());
        assert!(parse_script("wait").is_err());
    }

    #[test]
    fn test_parse_timeline() {
        let config = SimConfig::default();
        let entries = vec![
            TimelineEntry { start_time: 2.0, command: "skill".into() },
            TimelineEntry { start_time: 0.5, command: "attack".into() },
            TimelineEntry { start_time: 1.0, command: "wait 3".into() },
        ];
        let commands = parse_timeline(&config, &entries).unwrap();
        assert_eq!(commands, vec![(5, Command::Normal(0)), (20, Command::Skill)]);
    }

    #[test]
    fn test_timeline_unknown_command_is_error() {
        let config = SimConfig::default();
        let entries = vec![TimelineEntry { start_time: 0.0, command: "dance".into() }];
        assert!(parse_timeline(&config, &entries).is_err());
    }
}
