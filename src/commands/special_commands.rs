//! Special commands parser for interactive chat mode
//!
//! This module parses the slash commands that manage the session rather
//! than being sent as a message:
//! - Creating, listing, switching, renaming and deleting chats
//! - Replaying the current chat's history
//! - Setting the API key
//! - Displaying help and exiting
//!
//! Command names are case-insensitive; arguments keep their case.
//! `/research` is deliberately not a special command: it is an ordinary
//! message that the chat session routes to the research pipeline.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Create a chat (optionally named) and switch to it
    NewChat(Option<String>),

    /// List all chats
    ListChats,

    /// Switch to the chat with this id
    SwitchChat(i64),

    /// Rename the current chat
    RenameChat(String),

    /// Delete the current chat
    DeleteChat,

    /// Print the current chat's messages
    History,

    /// Store a new API key
    SetKey(String),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent through the chat session.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use deskchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/switch 4").unwrap(), SpecialCommand::SwitchChat(4));
/// assert_eq!(
///     parse_special_command("/Rename Trip Notes").unwrap(),
///     SpecialCommand::RenameChat("Trip Notes".to_string())
/// );
/// assert_eq!(parse_special_command("/research rust").unwrap(), SpecialCommand::None);
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }

    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match trimmed.find(char::is_whitespace) {
        Some(idx) => (trimmed[..idx].to_lowercase(), trimmed[idx..].trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/research" => Ok(SpecialCommand::None),

        "/new" => Ok(SpecialCommand::NewChat(
            (!arg.is_empty()).then(|| arg.to_string()),
        )),

        "/chats" => Ok(SpecialCommand::ListChats),

        "/switch" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/switch".to_string(),
                    usage: "/switch <chat_id>".to_string(),
                });
            }
            arg.parse::<i64>()
                .map(SpecialCommand::SwitchChat)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/switch".to_string(),
                    arg: arg.to_string(),
                })
        }

        "/rename" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/rename".to_string(),
                    usage: "/rename <new name>".to_string(),
                })
            } else {
                Ok(SpecialCommand::RenameChat(arg.to_string()))
            }
        }

        "/delete" => Ok(SpecialCommand::DeleteChat),
        "/history" => Ok(SpecialCommand::History),

        "/key" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/key".to_string(),
                    usage: "/key <api key>".to_string(),
                })
            } else {
                Ok(SpecialCommand::SetKey(arg.to_string()))
            }
        }

        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
///
/// # Examples
///
/// ```
/// use deskchat::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

RESEARCH:
  /research <topic> - Search the web, read the top results and summarize them

CHATS:
  /new [name]     - Create a chat and switch to it
  /chats          - List all chats
  /switch <id>    - Switch to another chat
  /rename <name>  - Rename the current chat
  /delete         - Delete the current chat and its messages
  /history        - Show the current chat's messages

SETTINGS:
  /key <api key>  - Store the Gemini API key for this and future sessions

SESSION CONTROL:
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent to the model
  - Every message and reply is saved in the current chat
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("what is rust?").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_research_passes_through() {
        assert_eq!(
            parse_special_command("/research tokio").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("/RESEARCH").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_new_chat_with_and_without_name() {
        assert_eq!(
            parse_special_command("/new").unwrap(),
            SpecialCommand::NewChat(None)
        );
        assert_eq!(
            parse_special_command("/new  Weekend Plans ").unwrap(),
            SpecialCommand::NewChat(Some("Weekend Plans".to_string()))
        );
    }

    #[test]
    fn test_switch_requires_numeric_id() {
        assert_eq!(
            parse_special_command("/switch 12").unwrap(),
            SpecialCommand::SwitchChat(12)
        );
        assert!(matches!(
            parse_special_command("/switch"),
            Err(CommandError::MissingArgument { .. })
        ));
        assert!(matches!(
            parse_special_command("/switch abc"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
    }

    #[test]
    fn test_rename_keeps_case() {
        assert_eq!(
            parse_special_command("/RENAME MixedCase Name").unwrap(),
            SpecialCommand::RenameChat("MixedCase Name".to_string())
        );
        assert!(parse_special_command("/rename").is_err());
    }

    #[test]
    fn test_key_keeps_value_verbatim() {
        assert_eq!(
            parse_special_command("/key AbC-123").unwrap(),
            SpecialCommand::SetKey("AbC-123".to_string())
        );
        assert!(parse_special_command("/key   ").is_err());
    }

    #[test]
    fn test_exit_aliases() {
        for input in ["exit", "QUIT", "/exit", "/quit"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_special_command("/chats").unwrap(), SpecialCommand::ListChats);
        assert_eq!(parse_special_command("/delete").unwrap(), SpecialCommand::DeleteChat);
        assert_eq!(parse_special_command("/history").unwrap(), SpecialCommand::History);
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_special_command("/frobnicate now"),
            Err(CommandError::UnknownCommand("/frobnicate".to_string()))
        );
    }
}
