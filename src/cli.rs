//! Command-line interface definition for Deskchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot research, chat
//! management and credential settings.

use clap::{Parser, Subcommand};

/// Deskchat - research-capable chat assistant
///
/// Chat with a language model, keep conversations in a local history and
/// ask it to research a topic on the web with `/research <topic>`.
#[derive(Parser, Debug, Clone)]
#[command(name = "deskchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the conversation history database path
    #[arg(long, env = "DESKCHAT_HISTORY_DB")]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Deskchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Open the chat with this id instead of the latest one
        #[arg(long, conflicts_with = "new")]
        chat: Option<i64>,

        /// Start in a freshly created chat
        #[arg(long)]
        new: bool,
    },

    /// Research a topic on the web and print the summary
    ///
    /// The result is not stored in any chat.
    Research {
        /// Topic to research
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
    },

    /// Send one message and print the reply
    Ask {
        /// Message text; `/research <topic>` runs research
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Chat to use; defaults to the latest chat
        #[arg(long)]
        chat: Option<i64>,
    },

    /// Manage stored chats
    Chats {
        /// Chat management subcommand
        #[command(subcommand)]
        command: ChatsCommand,
    },

    /// Manage locally stored settings
    Settings {
        /// Settings subcommand
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Chat management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ChatsCommand {
    /// List all chats
    List,

    /// Create a new chat
    New {
        /// Chat name; defaults to a timestamp
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Rename a chat
    Rename {
        /// Chat id
        id: i64,
        /// New name
        name: String,
    },

    /// Delete a chat and its messages
    Delete {
        /// Chat id
        id: i64,
    },

    /// Print the messages of a chat
    Show {
        /// Chat id
        id: i64,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Store the Gemini API key
    SetKey {
        /// API key
        key: String,
    },

    /// Remove the stored Gemini API key
    ClearKey,

    /// Show where settings live and whether a key is stored
    Show,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: Commands::Chat {
                chat: None,
                new: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Chat {
                chat: None,
                new: false
            }
        ));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["deskchat", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn test_cli_parse_chat_with_id() {
        let cli = Cli::try_parse_from(["deskchat", "chat", "--chat", "7"]).unwrap();
        if let Commands::Chat { chat, new } = cli.command {
            assert_eq!(chat, Some(7));
            assert!(!new);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_chat_and_new_conflict() {
        assert!(Cli::try_parse_from(["deskchat", "chat", "--chat", "1", "--new"]).is_err());
    }

    #[test]
    fn test_cli_parse_research_topic_words() {
        let cli = Cli::try_parse_from(["deskchat", "research", "rust", "ownership"]).unwrap();
        if let Commands::Research { topic } = cli.command {
            assert_eq!(topic.join(" "), "rust ownership");
        } else {
            panic!("Expected Research command");
        }
    }

    #[test]
    fn test_cli_research_requires_topic() {
        assert!(Cli::try_parse_from(["deskchat", "research"]).is_err());
    }

    #[test]
    fn test_cli_parse_ask_with_chat() {
        let cli = Cli::try_parse_from(["deskchat", "ask", "--chat", "3", "hello", "there"]).unwrap();
        if let Commands::Ask { message, chat } = cli.command {
            assert_eq!(message, vec!["hello", "there"]);
            assert_eq!(chat, Some(3));
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_chats_rename() {
        let cli = Cli::try_parse_from(["deskchat", "chats", "rename", "2", "Notes"]).unwrap();
        if let Commands::Chats {
            command: ChatsCommand::Rename { id, name },
        } = cli.command
        {
            assert_eq!(id, 2);
            assert_eq!(name, "Notes");
        } else {
            panic!("Expected Chats Rename command");
        }
    }

    #[test]
    fn test_cli_parse_chats_new_with_name() {
        let cli = Cli::try_parse_from(["deskchat", "chats", "new", "--name", "Ideas"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Chats {
                command: ChatsCommand::New { name: Some(_) }
            }
        ));
    }

    #[test]
    fn test_cli_parse_settings_set_key() {
        let cli = Cli::try_parse_from(["deskchat", "settings", "set-key", "abc"]).unwrap();
        if let Commands::Settings {
            command: SettingsCommand::SetKey { key },
        } = cli.command
        {
            assert_eq!(key, "abc");
        } else {
            panic!("Expected Settings SetKey command");
        }
    }

    #[test]
    fn test_cli_parse_storage_path_and_verbose() {
        let cli = Cli::try_parse_from([
            "deskchat",
            "-v",
            "--storage-path",
            "/tmp/h.db",
            "chats",
            "list",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.storage_path.as_deref(), Some("/tmp/h.db"));
    }
}
