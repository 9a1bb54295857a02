use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// A named conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Store-assigned identifier
    pub id: i64,
    /// Display name, mutable through `rename_chat`
    pub name: String,
    /// When the chat was created
    pub created_at: DateTime<Utc>,
}

/// One turn of a conversation
///
/// Messages are never edited; they disappear only when their chat is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned identifier
    pub id: i64,
    /// Owning chat
    pub chat_id: i64,
    /// Message text, stored as given
    pub content: String,
    /// True for human-authored messages
    pub is_user: bool,
    /// When the message was captured
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Label used when printing transcripts
    pub fn author(&self) -> &'static str {
        if self.is_user {
            "You"
        } else {
            "Assistant"
        }
    }
}

/// Name given to chats created without an explicit one
pub fn default_chat_name() -> String {
    Local::now().format("Chat-%Y%m%d-%H%M%S").to_string()
}
