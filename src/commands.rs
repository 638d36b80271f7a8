//! Commands exposed to the host.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Proofread: fix spelling, grammar and punctuation.
    Check,
    /// Translate between the primary and secondary language.
    Translate,
    /// Rewrite for clarity and flow.
    Improve,
    /// Condense into a shorter version.
    Summarize,
    /// Continue writing after the caret.
    Continue,
    /// Apply the pending suggestion.
    Accept,
    /// Discard the pending suggestion.
    Clear,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Check,
        Command::Translate,
        Command::Improve,
        Command::Summarize,
        Command::Continue,
        Command::Accept,
        Command::Clear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Check => "check",
            Command::Translate => "translate",
            Command::Improve => "improve",
            Command::Summarize => "summarize",
            Command::Continue => "continue",
            Command::Accept => "accept",
            Command::Clear => "clear",
        }
    }

    /// Whether the command calls the model.
    pub fn needs_inference(&self) -> bool {
        !matches!(self, Command::Accept | Command::Clear)
    }

    /// Whether the result is appended at the caret instead of replacing text.
    pub fn is_completion(&self) -> bool {
        matches!(self, Command::Continue)
    }

    /// Notice shown when the model hands back nothing new.
    pub fn unchanged_message(&self) -> &'static str {
        match self {
            Command::Check => "No issues found.",
            Command::Translate => "Nothing to translate.",
            Command::Improve => "No improvements suggested.",
            Command::Summarize => "Text is already as short as it gets.",
            Command::Continue => "No continuation suggested.",
            Command::Accept | Command::Clear => "Nothing pending.",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "correct" | "proofread" => return Ok(Command::Check),
            "complete" => return Ok(Command::Continue),
            _ => {}
        }
        Command::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or(UnknownCommand(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for command in Command::ALL {
            assert_eq!(command.name().parse::<Command>().unwrap(), command);
        }
    }

    #[test]
    fn aliases_and_case() {
        assert_eq!("Proofread".parse::<Command>().unwrap(), Command::Check);
        assert_eq!(" complete ".parse::<Command>().unwrap(), Command::Continue);
        assert!("explain".parse::<Command>().is_err());
    }

    #[test]
    fn only_text_commands_need_inference() {
        assert!(Command::Check.needs_inference());
        assert!(!Command::Accept.needs_inference());
        assert!(!Command::Clear.needs_inference());
        assert!(Command::Continue.is_completion());
        assert!(!Command::Improve.is_completion());
    }
}
