//! Web search backends
//!
//! A `SearchEngine` turns a query into a short ranked list of absolute
//! result URLs. Every failure mode (transport errors, timeouts, bad status,
//! pages without results) collapses into an empty list so callers only have
//! one "no results" case to handle.

pub mod brave;
pub mod duckduckgo;

pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoSearch;

use crate::config::SearchConfig;
use crate::error::{DeskchatError, Result};
use async_trait::async_trait;
use url::Url;

/// User agent presented to search pages and fetched sites
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Web search capability
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Return up to `limit` absolute result URLs for `query`, best first
    ///
    /// Never fails; an empty vector means "no results".
    async fn search(&self, query: &str, limit: usize) -> Vec<String>;

    /// Backend name, for logging
    fn name(&self) -> &'static str;
}

/// Keep only absolute http(s) URLs, preserving order, up to `limit`
///
/// # Examples
///
/// ```
/// use deskchat::search::absolute_links;
///
/// let links = absolute_links(
///     vec!["/relative".to_string(), "https://a.example/".to_string(), "mailto:x@y".to_string()],
///     3,
/// );
/// assert_eq!(links, vec!["https://a.example/".to_string()]);
/// ```
pub fn absolute_links<I>(candidates: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    candidates
        .into_iter()
        .filter(|candidate| {
            Url::parse(candidate)
                .map(|url| {
                    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
                })
                .unwrap_or(false)
        })
        .take(limit)
        .collect()
}

/// Create the search backend named in configuration
///
/// # Errors
///
/// Returns error if the engine name is unknown or the HTTP client cannot
/// be built
pub fn create_search_engine(config: &SearchConfig) -> Result<Box<dyn SearchEngine>> {
    match config.engine.as_str() {
        "duckduckgo" => Ok(Box::new(DuckDuckGoSearch::new(
            config.duckduckgo.endpoint.clone(),
            config.timeout_seconds,
        )?)),
        "brave" => Ok(Box::new(BraveSearch::new(
            config.brave.clone(),
            config.timeout_seconds,
        )?)),
        other => {
            Err(DeskchatError::Search(format!("Unknown search engine: {}", other)).into())
        }
    }
}
