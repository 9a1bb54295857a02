use crate::cli::ChatsCommand;
use crate::config::Config;
use crate::error::{DeskchatError, Result};
use crate::storage::{Chat, ConversationStore, Message};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle chat management commands
pub fn handle_chats(config: &Config, command: ChatsCommand) -> Result<()> {
    let store = ConversationStore::new(config)?;

    match command {
        ChatsCommand::List => {
            let chats = store.list_chats()?;
            print_chat_table(&store, &chats, None)?;
        }
        ChatsCommand::New { name } => {
            let chat = store.create_chat(name.as_deref())?;
            println!(
                "{}",
                format!("Created chat {} ({})", chat.id, chat.name).green()
            );
        }
        ChatsCommand::Rename { id, name } => {
            store.rename_chat(id, &name)?;
            println!("{}", format!("Renamed chat {} to {}", id, name).green());
        }
        ChatsCommand::Delete { id } => {
            store.delete_chat(id)?;
            println!("{}", format!("Deleted chat {}", id).green());
        }
        ChatsCommand::Show { id } => {
            let chat = store
                .get_chat(id)?
                .ok_or(DeskchatError::ChatNotFound(id))?;
            println!("\n{} {}", "Chat:".bold(), chat.name.cyan());
            print_transcript(&store.messages(chat.id)?);
        }
    }

    Ok(())
}

/// Print chats as a table, marking `current` when given
pub fn print_chat_table(
    store: &ConversationStore,
    chats: &[Chat],
    current: Option<i64>,
) -> Result<()> {
    if chats.is_empty() {
        println!("{}", "No chats found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Name".bold(),
        "Messages".bold(),
        "Created".bold()
    ]);

    for chat in chats {
        let name: String = if chat.name.chars().count() > 40 {
            format!("{}...", chat.name.chars().take(37).collect::<String>())
        } else {
            chat.name.clone()
        };
        let name = if current == Some(chat.id) {
            format!("{} *", name)
        } else {
            name
        };
        let message_count = store.messages(chat.id)?.len();
        let created = chat
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();

        table.add_row(prettytable::row![
            chat.id.to_string().cyan(),
            name,
            message_count,
            created
        ]);
    }

    println!("\nChats:");
    table.printstd();
    println!();
    println!(
        "Use {} to open a chat.",
        "deskchat chat --chat <ID>".cyan()
    );
    println!();

    Ok(())
}

/// Print a chat's messages in order
pub fn print_transcript(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", "(no messages yet)".dimmed());
        println!();
        return;
    }

    for message in messages {
        let author = if message.is_user {
            message.author().green().bold()
        } else {
            message.author().blue().bold()
        };
        println!("{}: {}", author, message.content);
    }
    println!();
}
