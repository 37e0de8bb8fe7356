//! Shell input protocol
//!
//! One line per command. Lines starting with `/` are commands, anything
//! else replaces the symptom text. `//` escapes a leading slash.

use crate::session::Intent;

/// Commands accepted from the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Forward to the session
    Intent(Intent),
    /// Print the current view again
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: /{0} (try /help)")]
    UnknownCommand(String),
}

pub const HELP: &str = "\
Type a line to replace the symptom description.
  /mic       start or stop dictation
  /submit    send the description for triage
  /reset     start a new case after a result or failure
  /dismiss   dismiss the microphone message
  /clear     empty the description
  /show      show the current state
  /quit      exit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(ShellCommand::Intent(Intent::Edit(line.to_string()))));
    };
    if rest.starts_with('/') {
        return Ok(Some(ShellCommand::Intent(Intent::Edit(rest.to_string()))));
    }

    let command = match rest.trim().to_ascii_lowercase().as_str() {
        "mic" => ShellCommand::Intent(Intent::ToggleDictation),
        "submit" => ShellCommand::Intent(Intent::Submit),
        "reset" => ShellCommand::Intent(Intent::Reset),
        "dismiss" => ShellCommand::Intent(Intent::DismissMicError),
        "clear" => ShellCommand::Intent(Intent::Edit(String::new())),
        "show" => ShellCommand::Show,
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(
            parse_line("/mic").unwrap(),
            Some(ShellCommand::Intent(Intent::ToggleDictation))
        );
        assert_eq!(
            parse_line("/submit\n").unwrap(),
            Some(ShellCommand::Intent(Intent::Submit))
        );
        assert_eq!(
            parse_line("/Reset").unwrap(),
            Some(ShellCommand::Intent(Intent::Reset))
        );
        assert_eq!(
            parse_line("/dismiss").unwrap(),
            Some(ShellCommand::Intent(Intent::DismissMicError))
        );
        assert_eq!(parse_line("/quit").unwrap(), Some(ShellCommand::Quit));
    }

    #[test]
    fn test_text_is_an_edit() {
        assert_eq!(
            parse_line("fever since Tuesday").unwrap(),
            Some(ShellCommand::Intent(Intent::Edit("fever since Tuesday".to_string())))
        );
        assert_eq!(
            parse_line("//slash first").unwrap(),
            Some(ShellCommand::Intent(Intent::Edit("/slash first".to_string())))
        );
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_line("/triage"),
            Err(ParseError::UnknownCommand("triage".to_string()))
        );
    }
}
