//! Deskchat - research-capable chat assistant library
//!
//! This library provides the core functionality for Deskchat: persistent
//! chats with a language model, and a research pipeline that searches the
//! web, reads the top results and asks the model to summarize them.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `extract`: HTML to plain text
//! - `search`: Web search backends (DuckDuckGo, Brave)
//! - `fetch`: Page fetching with timeout and host guard
//! - `research`: Search, scrape and summarize pipeline
//! - `providers`: Language model abstraction and implementations (Gemini, Ollama)
//! - `storage`: SQLite conversation store
//! - `settings`: Locally persisted credential
//! - `session`: Turn orchestration over store, provider and research
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use deskchat::{ChatSession, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let session = ChatSession::from_config(&config)?;
//!     let chat = session.store().latest_chat_or_create()?;
//!     println!("{}", session.send(chat.id, "/research rust ownership").await?);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod providers;
pub mod research;
pub mod search;
pub mod session;
pub mod settings;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{DeskchatError, Result};
pub use research::ResearchAggregator;
pub use session::ChatSession;
pub use settings::Settings;
pub use storage::ConversationStore;
