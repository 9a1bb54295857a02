/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`     - Interactive chat mode
- `research` - One-shot research of a topic
- `ask`      - Send a single message through a chat
- `chats`    - Chat management
- `settings` - Credential management
*/

use crate::config::Config;
use crate::error::Result;
use crate::session::ChatSession;

// Special commands parser for the interactive loop
pub mod special_commands;

// Chat management commands
pub mod chats;

// Settings commands
pub mod settings;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Builds a `ChatSession`, picks the chat to open and runs a
    //! readline-based loop. Slash commands manage chats; everything else
    //! goes through `ChatSession::send`.

    use super::*;
    use crate::commands::chats::{print_chat_table, print_transcript};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::error::DeskchatError;
    use crate::session::{parse_turn, TurnRequest};
    use crate::storage::Chat;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `chat_id` - Open this chat instead of the latest one
    /// * `new_chat` - Start in a freshly created chat
    pub async fn run_chat(config: Config, chat_id: Option<i64>, new_chat: bool) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let mut session = ChatSession::from_config(&config)?;
        let mut chat = open_chat(&session, chat_id, new_chat)?;

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&chat);
        print_transcript(&session.store().messages(chat.id)?);

        loop {
            let prompt = format!("[{}] >> ", chat.name).cyan().to_string();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::None => {}
                        SpecialCommand::Exit => break,
                        other => {
                            if let Err(e) = handle_special(&mut session, &mut chat, other) {
                                eprintln!("{}", format!("Error: {:#}", e).red());
                            }
                            continue;
                        }
                    }

                    if is_research_request(&line) {
                        println!("{}", "Researching...".dimmed());
                    }

                    match session.send(chat.id, &line).await {
                        Ok(reply) => {
                            println!("\n{}: {}\n", "Assistant".blue().bold(), reply);
                        }
                        Err(e) => {
                            tracing::error!("Turn failed: {:#}", e);
                            eprintln!("{}", format!("Error: {:#}", e).red());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn is_research_request(line: &str) -> bool {
        matches!(
            parse_turn(line),
            TurnRequest::Research(_) | TurnRequest::ResearchUsage
        )
    }

    /// Pick the chat the loop starts in
    pub(crate) fn open_chat(
        session: &ChatSession,
        chat_id: Option<i64>,
        new_chat: bool,
    ) -> Result<Chat> {
        let store = session.store();
        if new_chat {
            return store.create_chat(None);
        }
        match chat_id {
            Some(id) => Ok(store
                .get_chat(id)?
                .ok_or(DeskchatError::ChatNotFound(id))?),
            None => store.latest_chat_or_create(),
        }
    }

    /// Apply a session-management command
    pub(crate) fn handle_special(
        session: &mut ChatSession,
        chat: &mut Chat,
        command: SpecialCommand,
    ) -> Result<()> {
        match command {
            SpecialCommand::NewChat(name) => {
                *chat = session.store().create_chat(name.as_deref())?;
                println!("{}", format!("Switched to new chat {}\n", chat.name).green());
            }
            SpecialCommand::ListChats => {
                let chats = session.store().list_chats()?;
                print_chat_table(session.store(), &chats, Some(chat.id))?;
            }
            SpecialCommand::SwitchChat(id) => {
                *chat = session
                    .store()
                    .get_chat(id)?
                    .ok_or(DeskchatError::ChatNotFound(id))?;
                println!("{}", format!("Switched to chat {}\n", chat.name).green());
                print_transcript(&session.store().messages(chat.id)?);
            }
            SpecialCommand::RenameChat(name) => {
                session.store().rename_chat(chat.id, &name)?;
                chat.name = name;
                println!("{}", format!("Renamed chat to {}\n", chat.name).green());
            }
            SpecialCommand::DeleteChat => {
                let deleted = chat.name.clone();
                session.store().delete_chat(chat.id)?;
                *chat = match session.store().list_chats()?.into_iter().next() {
                    Some(oldest) => oldest,
                    None => session.store().create_chat(None)?,
                };
                println!(
                    "{}",
                    format!("Deleted chat {}; now in {}\n", deleted, chat.name).green()
                );
            }
            SpecialCommand::History => {
                print_transcript(&session.store().messages(chat.id)?);
            }
            SpecialCommand::SetKey(key) => {
                session.set_api_key(Some(key))?;
                println!(
                    "{}",
                    format!("API key saved to {}\n", session.settings_path().display()).green()
                );
            }
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
        Ok(())
    }

    fn print_welcome_banner(chat: &Chat) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                Deskchat Interactive Chat                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Chat: {} (id {})", chat.name.cyan(), chat.id);
        println!("Type '/research <topic>' to research the web, '/help' for commands, 'exit' to quit\n");
    }

}

// One-shot research handler
pub mod research {
    //! Runs the research pipeline once and prints the result.

    use super::*;
    use crate::providers::{create_provider, Provider};
    use crate::research::ResearchAggregator;
    use crate::settings::Settings;
    use std::sync::Arc;

    /// Research `topic` and print the summary without storing it
    pub async fn run_research(config: Config, topic: &str) -> Result<()> {
        let settings = Settings::load(Settings::resolve_path(&config)?);
        let provider: Arc<dyn Provider> =
            Arc::from(create_provider(&config.provider, None, &settings)?);
        let aggregator = ResearchAggregator::from_config(&config, provider)?;

        tracing::info!("Researching '{}'", topic);
        println!("{}", aggregator.research(topic.trim()).await);
        Ok(())
    }
}

// Single-turn handler
pub mod ask {
    //! Sends one message through a chat session and prints the reply.

    use super::*;
    use crate::error::DeskchatError;

    /// Send `message` to `chat_id` (or the latest chat) and print the reply
    pub async fn run_ask(config: Config, message: &str, chat_id: Option<i64>) -> Result<()> {
        let session = ChatSession::from_config(&config)?;
        let chat = match chat_id {
            Some(id) => session
                .store()
                .get_chat(id)?
                .ok_or(DeskchatError::ChatNotFound(id))?,
            None => session.store().latest_chat_or_create()?,
        };

        let reply = session.send(chat.id, message).await?;
        println!("{}", reply);
        Ok(())
    }
}
