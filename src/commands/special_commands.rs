//! Special commands parser for the interactive chat REPL
//!
//! Lines starting with `/` manage sessions and attachments instead of being
//! sent to the assistant. Commands are case-insensitive; arguments (ids,
//! paths, titles) keep their original case.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    Help,
    /// List sessions, marking the active one
    Sessions,
    /// Create and switch to a new session
    New(Option<String>),
    /// Switch by id or unique id prefix
    Switch(String),
    /// Delete the given session, or the active one
    Delete(Option<String>),
    Attach(PathBuf),
    Detach,
    /// Clear all messages in the active session
    Clear,
    /// Reprint the active session's messages
    History,
    Exit,
    /// Regular message for the assistant
    None,
}

/// Parse one REPL line
///
/// # Examples
///
/// ```
/// use synopsis::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new Reading list").unwrap(),
///            SpecialCommand::New(Some("Reading list".to_string())));
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/frobnicate").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match command.as_str() {
        "/help" | "/?" => bare(&command, &arg, SpecialCommand::Help),
        "/sessions" | "/list" => bare(&command, &arg, SpecialCommand::Sessions),
        "/new" => Ok(SpecialCommand::New(arg)),
        "/switch" | "/open" => arg.map(SpecialCommand::Switch).ok_or_else(|| {
            CommandError::MissingArgument {
                command: "/switch".to_string(),
                usage: "/switch <session_id>".to_string(),
            }
        }),
        "/delete" => Ok(SpecialCommand::Delete(arg)),
        "/attach" => arg
            .map(|p| SpecialCommand::Attach(PathBuf::from(p)))
            .ok_or_else(|| CommandError::MissingArgument {
                command: "/attach".to_string(),
                usage: "/attach <path>".to_string(),
            }),
        "/detach" => bare(&command, &arg, SpecialCommand::Detach),
        "/clear" => bare(&command, &arg, SpecialCommand::Clear),
        "/history" => bare(&command, &arg, SpecialCommand::History),
        "exit" | "quit" | "/exit" | "/quit" => bare(&command, &arg, SpecialCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn bare(
    command: &str,
    arg: &Option<String>,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    match arg {
        Some(extra) => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: extra.clone(),
        }),
        None => Ok(parsed),
    }
}

pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

SESSIONS:
  /sessions       - List conversations (* marks the active one)
  /new [title]    - Start a new conversation
  /switch <id>    - Switch to a conversation (id prefix is enough)
  /delete [id]    - Delete a conversation (default: the active one)
  /clear          - Remove all messages from the active conversation
  /history        - Show the active conversation again

ATTACHMENTS:
  /attach <path>  - Attach a PDF, DOC, DOCX or TXT file (max 10 MB)
  /detach         - Remove the staged attachment

OTHER:
  /help           - Show this help
  /exit, exit     - Leave chat

Anything else is sent to the assistant. A staged attachment goes with the
next message.
"#
    );
}
