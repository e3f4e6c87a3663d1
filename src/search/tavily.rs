//! Tavily Search Client
//!
//! Web search backend used by the attractions searcher. Wraps the Tavily
//! REST API and renders responses as a single text block the reasoning step
//! can consume: an optional synthesized answer followed by up to
//! `max_results` individual results.
//!
//! Per the capability contract, nothing here raises past the boundary: a
//! missing credential and transport failures both come back as descriptive
//! error strings in place of results.

use crate::config::SearchConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const TAVILY_API_BASE: &str = "https://api.tavily.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body content beyond this many characters is truncated in the formatted
/// output to keep prompt sizes bounded.
const CONTENT_TRUNCATE_CHARS: usize = 300;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("TAVILY_API_KEY not configured")]
    NoApiKey,

    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse search results: {0}")]
    ParseError(String),
}

/// Text search capability used by the attractions step.
///
/// The pipeline only ever sees formatted text; error conditions are
/// reported inline so a degraded search never aborts a run.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> String;
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    include_images: bool,
    include_raw_content: bool,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Tavily client. The API credential is supplied at construction from an
/// explicit [`SearchConfig`]; it is never read from the process environment
/// at call time.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn from_config(config: &SearchConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key: config.tavily_api_key.clone(),
            base_url: TAVILY_API_BASE.to_string(),
        }
    }

    /// Point the client at an alternative endpoint. Used with mock HTTP
    /// servers in tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn execute(&self, query: &str, max_results: usize) -> Result<TavilyResponse, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::NoApiKey);
        }

        info!(query = %query, max_results, "Searching via Tavily");

        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            include_answer: true,
            include_images: false,
            include_raw_content: false,
            max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        debug!("Raw Tavily response received");

        response
            .json::<TavilyResponse>()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> String {
        match self.execute(query, max_results).await {
            Ok(response) => {
                let formatted = format_results(&response, max_results);
                info!(result_count = response.results.len(), "Tavily search completed");
                formatted
            }
            Err(SearchError::NoApiKey) => {
                warn!("Tavily search skipped: no API key configured");
                "Error: TAVILY_API_KEY environment variable not set. Please set your Tavily API key."
                    .to_string()
            }
            Err(e) => {
                warn!(error = %e, "Tavily search failed");
                format!("Error making request to Tavily API: {}", e)
            }
        }
    }
}

fn format_results(response: &TavilyResponse, max_results: usize) -> String {
    let mut lines = Vec::new();

    if let Some(answer) = response.answer.as_deref().filter(|a| !a.is_empty()) {
        lines.push(format!("**Answer:** {}\n", answer));
    }

    if !response.results.is_empty() {
        lines.push("**Search Results:**".to_string());
        for (i, result) in response.results.iter().take(max_results).enumerate() {
            let title = result.title.as_deref().unwrap_or("No title");
            let url = result.url.as_deref().unwrap_or("No URL");
            let content = result.content.as_deref().unwrap_or("No content available");

            lines.push(format!("\n{}. **{}**", i + 1, title));
            lines.push(format!("   URL: {}", url));
            lines.push(format!("   Content: {}", truncate_content(content)));
        }
    }

    if lines.is_empty() {
        "No results found for the given query.".to_string()
    } else {
        lines.join("\n")
    }
}

/// Truncate on a character boundary, appending an ellipsis marker when
/// anything was cut.
fn truncate_content(content: &str) -> String {
    let mut truncated: String = content.chars().take(CONTENT_TRUNCATE_CHARS).collect();
    if content.chars().count() > CONTENT_TRUNCATE_CHARS {
        truncated.push_str("...");
    }
    truncated
}
