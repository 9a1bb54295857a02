//! Turn orchestration for Deskchat
//!
//! A `ChatSession` owns the store, the provider and the research pipeline.
//! `send` persists the user's message before anything touches the network,
//! routes it to research or plain generation, then persists the reply.

use crate::config::Config;
use crate::error::Result;
use crate::providers::{create_provider, Provider};
use crate::research::ResearchAggregator;
use crate::settings::Settings;
use crate::storage::ConversationStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Reply to a research command without a topic
pub const RESEARCH_USAGE: &str = "Usage: /research <topic>";

/// How an input line should be handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRequest<'a> {
    /// Send the message to the provider as is
    Chat(&'a str),
    /// Run the research pipeline on the topic
    Research(&'a str),
    /// `/research` with nothing after it
    ResearchUsage,
}

/// Classify an input line
///
/// The first whitespace-separated token decides: `/research` in any case
/// starts a research command and the trimmed remainder is the topic.
///
/// # Examples
///
/// ```
/// use deskchat::session::{parse_turn, TurnRequest};
///
/// assert_eq!(parse_turn("/RESEARCH  tokio "), TurnRequest::Research("tokio"));
/// assert_eq!(parse_turn("/research"), TurnRequest::ResearchUsage);
/// assert_eq!(parse_turn("/researching"), TurnRequest::Chat("/researching"));
/// ```
pub fn parse_turn(input: &str) -> TurnRequest<'_> {
    let trimmed = input.trim_start();
    let (command, rest) = match trimmed.find(char::is_whitespace) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };

    if !command.eq_ignore_ascii_case("/research") {
        return TurnRequest::Chat(input);
    }

    let topic = rest.trim();
    if topic.is_empty() {
        TurnRequest::ResearchUsage
    } else {
        TurnRequest::Research(topic)
    }
}

/// A conversation front end's view of the system
pub struct ChatSession {
    store: ConversationStore,
    provider: Arc<dyn Provider>,
    aggregator: ResearchAggregator,
    settings: Settings,
    settings_path: PathBuf,
}

impl ChatSession {
    /// Assemble a session from already built parts
    pub fn new(
        store: ConversationStore,
        provider: Arc<dyn Provider>,
        aggregator: ResearchAggregator,
        settings: Settings,
        settings_path: PathBuf,
    ) -> Self {
        Self {
            store,
            provider,
            aggregator,
            settings,
            settings_path,
        }
    }

    /// Build every collaborator from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the store, provider or search engine cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings_path = Settings::resolve_path(config)?;
        let settings = Settings::load(&settings_path);
        let provider: Arc<dyn Provider> =
            Arc::from(create_provider(&config.provider, None, &settings)?);
        let aggregator = ResearchAggregator::from_config(config, provider.clone())?;
        let store = ConversationStore::new(config)?;

        tracing::info!(
            "Chat session ready: provider={}, store={}",
            provider.name(),
            store.path().display()
        );

        Ok(Self::new(store, provider, aggregator, settings, settings_path))
    }

    /// The conversation store
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// The research pipeline
    pub fn aggregator(&self) -> &ResearchAggregator {
        &self.aggregator
    }

    /// Currently loaded settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Where settings are persisted
    pub fn settings_path(&self) -> &std::path::Path {
        &self.settings_path
    }

    /// Handle one user message in `chat_id` and return the assistant reply
    ///
    /// # Errors
    ///
    /// Returns error if either message cannot be persisted. If the user
    /// message fails to persist no network call is made.
    pub async fn send(&self, chat_id: i64, input: &str) -> Result<String> {
        self.store.append_message(chat_id, input, true)?;

        let response = match parse_turn(input) {
            TurnRequest::Chat(message) => {
                tracing::debug!("Chat turn in {} ({} chars)", chat_id, message.len());
                self.provider.generate(message).await
            }
            TurnRequest::Research(topic) => {
                tracing::info!("Research turn in {}: {}", chat_id, topic);
                self.aggregator.research(topic).await
            }
            TurnRequest::ResearchUsage => RESEARCH_USAGE.to_string(),
        };

        self.store.append_message(chat_id, &response, false)?;
        Ok(response)
    }

    /// Replace the API key for subsequent turns and persist it
    ///
    /// A blank key clears the credential.
    ///
    /// # Errors
    ///
    /// Returns error if the settings file cannot be written
    pub fn set_api_key(&mut self, api_key: Option<String>) -> Result<()> {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        self.provider.set_api_key(api_key.clone());
        self.settings.gemini_api_key = api_key;
        self.settings.save(&self.settings_path)
    }
}
