//! Brave Search API backend

use super::{absolute_links, SearchEngine};
use crate::config::BraveConfig;
use crate::error::{DeskchatError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Search backend using the Brave web search JSON API
///
/// The subscription token comes from configuration, falling back to the
/// `BRAVE_API_KEY` environment variable. Without a token every search
/// returns no results.
pub struct BraveSearch {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    url: Option<String>,
}

impl BraveSearch {
    /// Create a backend from configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: BraveConfig, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("deskchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeskchatError::Search(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var("BRAVE_API_KEY")
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            });

        if api_key.is_none() {
            tracing::warn!("Brave search selected but no API key is configured");
        }

        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key,
        })
    }

    async fn query_api(
        &self,
        api_key: &str,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<String>, String> {
        let count = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("count", count.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Brave returned status {}: {}", status, body));
        }

        let parsed: BraveResponse = response.json().await.map_err(|e| e.to_string())?;
        let urls = parsed
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|result| result.url);

        Ok(absolute_links(urls, limit))
    }
}

#[async_trait]
impl SearchEngine for BraveSearch {
    async fn search(&self, query: &str, limit: usize) -> Vec<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Skipping Brave search: no API key");
            return Vec::new();
        };

        match self.query_api(api_key, query, limit).await {
            Ok(urls) => {
                tracing::info!("Brave returned {} result links", urls.len());
                urls
            }
            Err(e) => {
                tracing::warn!("Brave search failed: {}", e);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "brave"
    }
}
