//! DuckDuckGo HTML search backend
//!
//! Posts the query to the no-JavaScript results page and reads the result
//! anchors (`a.result__a`). Result links are sometimes wrapped in a
//! DuckDuckGo redirect (`//duckduckgo.com/l/?uddg=<encoded>&rut=...`); those
//! are unwrapped to their destination before filtering.

use super::{absolute_links, SearchEngine, BROWSER_USER_AGENT};
use crate::error::{DeskchatError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

const DUCKDUCKGO_BASE: &str = "https://duckduckgo.com/";

/// Search backend scraping the DuckDuckGo HTML endpoint
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    /// Create a backend posting to `endpoint`
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(endpoint: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| DeskchatError::Search(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = endpoint.into();
        tracing::info!("Initialized DuckDuckGo search: endpoint={}", endpoint);

        Ok(Self { client, endpoint })
    }

    async fn results_page(&self, query: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("DuckDuckGo returned status {}", status));
        }

        response.text().await.map_err(|e| e.to_string())
    }
}

/// Pull result links out of a DuckDuckGo results page
///
/// `scraper::Html` is not `Send`, so parsing stays in this synchronous
/// helper and never lives across an await point.
pub(crate) fn parse_result_links(html: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a.result__a") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let hrefs = document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(unwrap_redirect)
        .collect::<Vec<_>>();

    absolute_links(hrefs, limit)
}

/// Resolve a DuckDuckGo redirect link to its destination
///
/// Only `duckduckgo.com/l/` links are unwrapped; anything else, including
/// ordinary URLs that carry a `uddg` parameter, passes through unchanged.
fn unwrap_redirect(href: &str) -> String {
    let resolved = match Url::parse(DUCKDUCKGO_BASE).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved,
        Err(_) => return href.to_string(),
    };

    let is_redirect = resolved
        .host_str()
        .map_or(false, |host| host.eq_ignore_ascii_case("duckduckgo.com"))
        && resolved.path().starts_with("/l/");
    if !is_redirect {
        return href.to_string();
    }

    resolved
        .query_pairs()
        .find(|(name, _)| name == "uddg")
        .map(|(_, target)| target.into_owned())
        .filter(|target| !target.is_empty())
        .unwrap_or_else(|| href.to_string())
}

#[async_trait]
impl SearchEngine for DuckDuckGoSearch {
    async fn search(&self, query: &str, limit: usize) -> Vec<String> {
        tracing::debug!("DuckDuckGo search: query={:?}, limit={}", query, limit);

        match self.results_page(query).await {
            Ok(html) => {
                let links = parse_result_links(&html, limit);
                tracing::info!("DuckDuckGo returned {} result links", links.len());
                links
            }
            Err(e) => {
                tracing::warn!("DuckDuckGo search failed: {}", e);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}
