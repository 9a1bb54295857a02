use crate::config::Config;
use crate::error::{DeskchatError, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

pub mod types;
pub use types::{default_chat_name, Chat, Message};

/// SQLite-backed store of chats and their messages
///
/// Each operation opens its own connection and runs inside one transaction.
pub struct ConversationStore {
    db_path: PathBuf,
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn chat_from_row(row: &Row<'_>) -> rusqlite::Result<Chat> {
    let created_at: String = row.get(2)?;
    Ok(Chat {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_timestamp(&created_at),
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let created_at: String = row.get(4)?;
    Ok(Message {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        content: row.get(2)?,
        is_user: row.get(3)?,
        created_at: parse_timestamp(&created_at),
    })
}

impl ConversationStore {
    /// Create a store at the location named by configuration
    ///
    /// `storage.history_db` wins (it already carries `DESKCHAT_HISTORY_DB`
    /// and `--storage-path`); otherwise `history.db` in the user's data
    /// directory is used.
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be determined or created,
    /// or the schema cannot be initialized
    pub fn new(config: &Config) -> Result<Self> {
        if let Some(path) = &config.storage.history_db {
            return Self::new_with_path(path);
        }

        let proj_dirs = ProjectDirs::from("com", "deskchat", "deskchat")
            .ok_or_else(|| DeskchatError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("history.db"))
    }

    /// Create a store backed by the database file at `db_path`
    ///
    /// # Examples
    ///
    /// ```
    /// use deskchat::storage::ConversationStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = ConversationStore::new_with_path(dir.path().join("history.db")).unwrap();
    /// assert!(store.list_chats().unwrap().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for database")
                    .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;
            }
        }

        let store = Self { db_path };
        store.init()?;
        tracing::debug!("Conversation store at {}", store.db_path.display());
        Ok(store)
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        Ok(conn)
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id INTEGER NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                is_user INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_chat_id ON messages(chat_id);",
        )
        .context("Failed to create tables")
        .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        Ok(())
    }

    /// All chats in creation order
    pub fn list_chats(&self) -> Result<Vec<Chat>> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        let chats = {
            let mut stmt = tx
                .prepare("SELECT id, name, created_at FROM chats ORDER BY id ASC")
                .context("Failed to prepare statement")
                .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

            let rows = stmt
                .query_map([], chat_from_row)
                .context("Failed to query chats")
                .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .context("Failed to read chat row")
                .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?
        };

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        Ok(chats)
    }

    /// Create a chat, naming it from the current local time when `name` is absent
    pub fn create_chat(&self, name: Option<&str>) -> Result<Chat> {
        let name = name.map(str::to_string).unwrap_or_else(default_chat_name);
        let created_at = Utc::now();

        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        tx.execute(
            "INSERT INTO chats (name, created_at) VALUES (?, ?)",
            params![name, created_at.to_rfc3339()],
        )
        .context("Failed to insert chat")
        .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;
        let id = tx.last_insert_rowid();

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        tracing::info!("Created chat {} ({})", id, name);
        Ok(Chat {
            id,
            name,
            created_at,
        })
    }

    /// Look up one chat
    pub fn get_chat(&self, id: i64) -> Result<Option<Chat>> {
        let conn = self.open()?;
        conn.query_row(
            "SELECT id, name, created_at FROM chats WHERE id = ?",
            params![id],
            chat_from_row,
        )
        .optional()
        .context("Failed to query chat")
        .map_err(|e| DeskchatError::Storage(format!("{:#}", e)).into())
    }

    /// Most recently created chat, creating one when the store is empty
    pub fn latest_chat_or_create(&self) -> Result<Chat> {
        let latest = {
            let conn = self.open()?;
            conn.query_row(
                "SELECT id, name, created_at FROM chats ORDER BY id DESC LIMIT 1",
                [],
                chat_from_row,
            )
            .optional()
            .context("Failed to query latest chat")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?
        };

        match latest {
            Some(chat) => Ok(chat),
            None => self.create_chat(None),
        }
    }

    /// Rename a chat
    ///
    /// # Errors
    ///
    /// Returns `DeskchatError::ChatNotFound` if no chat has this id
    pub fn rename_chat(&self, id: i64, new_name: &str) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        let updated = tx
            .execute(
                "UPDATE chats SET name = ? WHERE id = ?",
                params![new_name, id],
            )
            .context("Failed to rename chat")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        if updated == 0 {
            return Err(DeskchatError::ChatNotFound(id).into());
        }

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        tracing::info!("Renamed chat {} to {}", id, new_name);
        Ok(())
    }

    /// Delete a chat and every message it owns
    ///
    /// Deleting an unknown id is not an error.
    pub fn delete_chat(&self, id: i64) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        let deleted = tx
            .execute("DELETE FROM chats WHERE id = ?", params![id])
            .context("Failed to delete chat")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        if deleted > 0 {
            tracing::info!("Deleted chat {}", id);
        }
        Ok(())
    }

    /// Append a message to the end of a chat
    ///
    /// # Errors
    ///
    /// Returns `DeskchatError::ChatNotFound` if the chat does not exist
    pub fn append_message(&self, chat_id: i64, content: &str, is_user: bool) -> Result<Message> {
        let created_at = Utc::now();

        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM chats WHERE id = ?",
                params![chat_id],
                |_| Ok(()),
            )
            .optional()
            .context("Failed to query chat")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?
            .is_some();
        if !exists {
            return Err(DeskchatError::ChatNotFound(chat_id).into());
        }

        tx.execute(
            "INSERT INTO messages (chat_id, content, is_user, created_at) VALUES (?, ?, ?, ?)",
            params![chat_id, content, is_user, created_at.to_rfc3339()],
        )
        .context("Failed to insert message")
        .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;
        let id = tx.last_insert_rowid();

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        tracing::debug!(
            "Appended message {} to chat {} (is_user={})",
            id,
            chat_id,
            is_user
        );
        Ok(Message {
            id,
            chat_id,
            content: content.to_string(),
            is_user,
            created_at,
        })
    }

    /// Messages of a chat in append order
    ///
    /// An unknown or deleted chat has no messages.
    pub fn messages(&self, chat_id: i64) -> Result<Vec<Message>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, chat_id, content, is_user, created_at
                FROM messages
                WHERE chat_id = ?
                ORDER BY id ASC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        let rows = stmt
            .query_map(params![chat_id], message_from_row)
            .context("Failed to query messages")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        let messages = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read message row")
            .map_err(|e| DeskchatError::Storage(format!("{:#}", e)))?;

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Returns the store together with its `TempDir` so the directory outlives the test body.
    fn create_test_store() -> (ConversationStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store = ConversationStore::new_with_path(dir.path().join("history.db"))
            .expect("failed to create store");
        (store, dir)
    }

    fn table_count(store: &ConversationStore, table: &str) -> i64 {
        let conn = Connection::open(store.path()).expect("open connection");
        conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type='table' AND name=?",
            params![table],
            |r| r.get(0),
        )
        .expect("query row")
    }

    #[test]
    fn test_init_creates_tables() {
        let (store, _dir) = create_test_store();
        assert_eq!(table_count(&store, "chats"), 1);
        assert_eq!(table_count(&store, "messages"), 1);
    }

    #[test]
    fn test_create_chat_with_default_name() {
        let (store, _dir) = create_test_store();
        let chat = store.create_chat(None).unwrap();
        assert!(chat.name.starts_with("Chat-"));
        // Chat-YYYYmmdd-HHMMSS
        assert_eq!(chat.name.len(), "Chat-20240101-120000".len());
    }

    #[test]
    fn test_list_chats_in_creation_order() {
        let (store, _dir) = create_test_store();
        let a = store.create_chat(Some("a")).unwrap();
        let b = store.create_chat(Some("b")).unwrap();
        let ids: Vec<i64> = store.list_chats().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_latest_chat_or_create() {
        let (store, _dir) = create_test_store();
        let created = store.latest_chat_or_create().unwrap();
        assert_eq!(store.list_chats().unwrap().len(), 1);

        assert_eq!(store.latest_chat_or_create().unwrap().id, created.id);

        let newer = store.create_chat(Some("newer")).unwrap();
        assert_eq!(store.latest_chat_or_create().unwrap().id, newer.id);
    }

    #[test]
    fn test_append_and_read_back_in_order() {
        let (store, _dir) = create_test_store();
        let chat = store.create_chat(Some("ordered")).unwrap();

        store.append_message(chat.id, "hi", true).unwrap();
        store.append_message(chat.id, "hello", false).unwrap();
        store.append_message(chat.id, "  spaced\n", true).unwrap();

        let messages = store.messages(chat.id).unwrap();
        let got: Vec<(&str, bool)> = messages
            .iter()
            .map(|m| (m.content.as_str(), m.is_user))
            .collect();
        assert_eq!(
            got,
            vec![("hi", true), ("hello", false), ("  spaced\n", true)]
        );
        assert!(messages.iter().all(|m| m.chat_id == chat.id));
    }

    #[test]
    fn test_append_to_unknown_chat_fails() {
        let (store, _dir) = create_test_store();
        let err = store.append_message(999, "orphan", true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeskchatError>(),
            Some(DeskchatError::ChatNotFound(999))
        ));
    }

    #[test]
    fn test_rename_chat() {
        let (store, _dir) = create_test_store();
        let chat = store.create_chat(Some("before")).unwrap();
        store.rename_chat(chat.id, "after").unwrap();
        assert_eq!(store.get_chat(chat.id).unwrap().unwrap().name, "after");
    }

    #[test]
    fn test_rename_unknown_chat_fails() {
        let (store, _dir) = create_test_store();
        assert!(store.rename_chat(42, "nope").is_err());
    }

    #[test]
    fn test_delete_chat_cascades() {
        let (store, _dir) = create_test_store();
        let chat = store.create_chat(Some("doomed")).unwrap();
        let keep = store.create_chat(Some("kept")).unwrap();
        store.append_message(chat.id, "a", true).unwrap();
        store.append_message(chat.id, "b", false).unwrap();
        store.append_message(keep.id, "c", true).unwrap();

        store.delete_chat(chat.id).unwrap();

        assert!(store.get_chat(chat.id).unwrap().is_none());
        assert!(store.messages(chat.id).unwrap().is_empty());
        assert_eq!(store.messages(keep.id).unwrap().len(), 1);

        let conn = Connection::open(store.path()).unwrap();
        let orphans: i64 = conn
            .query_row(
                "SELECT count(*) FROM messages WHERE chat_id = ?",
                params![chat.id],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_delete_chat_is_idempotent() {
        let (store, _dir) = create_test_store();
        let chat = store.create_chat(None).unwrap();
        store.delete_chat(chat.id).unwrap();
        store.delete_chat(chat.id).unwrap();
    }

    #[test]
    fn test_new_uses_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("history.db");
        let mut config = Config::default();
        config.storage.history_db = Some(db_path.to_string_lossy().to_string());

        let store = ConversationStore::new(&config).unwrap();
        assert_eq!(store.path(), db_path.as_path());
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.db");
        let chat_id = {
            let store = ConversationStore::new_with_path(&path).unwrap();
            let chat = store.create_chat(Some("persisted")).unwrap();
            store.append_message(chat.id, "remember me", true).unwrap();
            chat.id
        };

        let reopened = ConversationStore::new_with_path(&path).unwrap();
        assert_eq!(reopened.messages(chat_id).unwrap()[0].content, "remember me");
    }
}
