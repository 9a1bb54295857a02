//! Research pipeline for Deskchat
//!
//! Turns a topic into a summary: search, fetch each result in order, extract
//! text, assemble a bounded document and ask the provider to summarize it.
//! Every step degrades to text; nothing here returns an error.

use crate::config::Config;
use crate::error::Result;
use crate::extract::extract_text;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::providers::Provider;
use crate::search::{create_search_engine, SearchEngine};
use std::sync::Arc;

/// Response when the search produced no URLs
pub const NO_RESULTS_MESSAGE: &str =
    "Could not find any relevant websites for the research topic.";

/// Response when no fetched page yielded any text
pub const NO_CONTENT_MESSAGE: &str = "Could not scrape any content from the web.";

/// Result of fetching and extracting one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// Page fetched and its text extracted
    Extracted { url: String, text: String },
    /// Page could not be fetched
    Failed { url: String, reason: String },
}

impl ScrapeOutcome {
    /// URL this outcome belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Extracted { url, .. } | Self::Failed { url, .. } => url,
        }
    }
}

/// Outcomes of one research run, in search-rank order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResearchDocument {
    outcomes: Vec<ScrapeOutcome>,
}

impl ResearchDocument {
    /// Add one outcome at the end
    pub fn push(mut self, outcome: ScrapeOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    /// Recorded outcomes
    pub fn outcomes(&self) -> &[ScrapeOutcome] {
        &self.outcomes
    }

    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &ScrapeOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ScrapeOutcome::Failed { .. }))
    }

    /// Whether any page contributed non-whitespace text
    ///
    /// Failure diagnostics do not count.
    pub fn has_content(&self) -> bool {
        self.outcomes.iter().any(|o| match o {
            ScrapeOutcome::Extracted { text, .. } => !text.trim().is_empty(),
            ScrapeOutcome::Failed { .. } => false,
        })
    }

    /// Render the document fed to the summarizer
    ///
    /// # Examples
    ///
    /// ```
    /// use deskchat::research::{ResearchDocument, ScrapeOutcome};
    ///
    /// let doc = ResearchDocument::default()
    ///     .push(ScrapeOutcome::Extracted { url: "https://a".into(), text: "alpha".into() })
    ///     .push(ScrapeOutcome::Failed { url: "https://b".into(), reason: "HTTP 404".into() });
    /// assert_eq!(doc.render(), "alpha\n\nCould not scrape https://b: HTTP 404\n\n");
    /// ```
    pub fn render(&self) -> String {
        let mut rendered = String::new();
        for outcome in &self.outcomes {
            match outcome {
                ScrapeOutcome::Extracted { text, .. } => rendered.push_str(text),
                ScrapeOutcome::Failed { url, reason } => {
                    rendered.push_str(&format!("Could not scrape {}: {}", url, reason))
                }
            }
            rendered.push_str("\n\n");
        }
        rendered
    }
}

/// Where a research run stopped before generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchStage {
    /// Search returned nothing
    NoResults,
    /// Pages were tried but none yielded text
    NoContent(ResearchDocument),
    /// Document assembled and summarization prompt built
    Ready {
        document: ResearchDocument,
        prompt: String,
    },
}

/// Keep at most `max_chars` characters of `text`
///
/// ```
/// use deskchat::research::truncate_chars;
///
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("hi", 10), "hi");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Prompt asking the provider to summarize `document`
pub fn summary_prompt(topic: &str, document: &str) -> String {
    format!(
        "Please summarize the following content about '{}':\n\n{}",
        topic, document
    )
}

/// Search, scrape and summarize a topic
pub struct ResearchAggregator {
    search: Arc<dyn SearchEngine>,
    fetcher: Arc<dyn PageFetcher>,
    provider: Arc<dyn Provider>,
    result_limit: usize,
    max_document_chars: usize,
}

impl ResearchAggregator {
    /// Assemble an aggregator from its collaborators
    pub fn new(
        search: Arc<dyn SearchEngine>,
        fetcher: Arc<dyn PageFetcher>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self {
            search,
            fetcher,
            provider,
            result_limit: 3,
            max_document_chars: 10_000,
        }
    }

    /// Override the number of search results to scrape
    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    /// Override the document size cap, in characters
    pub fn with_max_document_chars(mut self, max_document_chars: usize) -> Self {
        self.max_document_chars = max_document_chars;
        self
    }

    /// Build the search engine and fetcher from configuration around `provider`
    ///
    /// # Errors
    ///
    /// Returns error if the configured search engine or fetcher cannot be constructed
    pub fn from_config(config: &Config, provider: Arc<dyn Provider>) -> Result<Self> {
        let search: Arc<dyn SearchEngine> = Arc::from(create_search_engine(&config.search)?);
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::from_config(&config.fetch)?);

        Ok(Self::new(search, fetcher, provider)
            .with_result_limit(config.search.result_limit)
            .with_max_document_chars(config.research.max_document_chars))
    }

    /// Run search and scraping, stopping before generation
    pub async fn gather(&self, topic: &str) -> ResearchStage {
        let urls = self.search.search(topic, self.result_limit).await;
        if urls.is_empty() {
            tracing::info!("No search results for research topic '{}'", topic);
            return ResearchStage::NoResults;
        }
        tracing::info!(
            "Researching '{}' across {} result(s) via {}",
            topic,
            urls.len(),
            self.search.name()
        );

        let mut document = ResearchDocument::default();
        for url in urls {
            let outcome = match self.fetcher.fetch(&url).await {
                Ok(body) => {
                    let text = extract_text(&body);
                    tracing::debug!("Extracted {} chars from {}", text.chars().count(), url);
                    ScrapeOutcome::Extracted { url, text }
                }
                Err(e) => {
                    tracing::warn!("Could not scrape {}: {}", url, e);
                    ScrapeOutcome::Failed {
                        url,
                        reason: e.to_string(),
                    }
                }
            };
            document = document.push(outcome);
        }

        if !document.has_content() {
            return ResearchStage::NoContent(document);
        }

        let rendered = document.render();
        let prompt = summary_prompt(topic, truncate_chars(&rendered, self.max_document_chars));
        ResearchStage::Ready { document, prompt }
    }

    /// Research `topic` and return the text shown to the user
    pub async fn research(&self, topic: &str) -> String {
        match self.gather(topic).await {
            ResearchStage::NoResults => NO_RESULTS_MESSAGE.to_string(),
            ResearchStage::NoContent(_) => NO_CONTENT_MESSAGE.to_string(),
            ResearchStage::Ready { prompt, .. } => {
                let response = self.provider.generate(&prompt).await;
                format!("**Research Summary for '{}'**\n\n{}", topic, response)
            }
        }
    }
}
