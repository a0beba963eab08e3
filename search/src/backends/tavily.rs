//! Tavily backend
//!
//! Implements the SearchBackend trait using the Tavily Search API.
//! See: https://docs.tavily.com/documentation/api-reference/endpoint/search

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::SearchBackend;
use crate::config::{SearchDepth, TavilyConfig};
use crate::error::BackendError;
use crate::http::{self, ClientOptions};
use crate::types::{SearchOptions, SearchResult};

const NAME: &str = "tavily";
const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Tavily Search API backend
pub struct TavilyBackend {
    client: Client,
    config: TavilyConfig,
    base_url: String,
}

impl TavilyBackend {
    pub fn new(config: TavilyConfig, timeout: Duration) -> Result<Self, BackendError> {
        let client = http::build_client(NAME, &ClientOptions::with_timeout(timeout))?;

        Ok(Self {
            client,
            config,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the backend at a different API host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(&self, options: &SearchOptions) -> TavilyRequest {
        TavilyRequest {
            query: options.query_with_site(),
            search_depth: self.config.search_depth,
            max_results: options.clamped_count(),
            include_raw_content: self.config.include_raw_content,
        }
    }

    fn convert(&self, r: TavilyResult) -> SearchResult {
        let content = match r.raw_content {
            Some(raw) if self.config.include_raw_content && !raw.is_empty() => raw,
            _ => r.content,
        };

        SearchResult {
            title: r.title,
            url: r.url,
            content,
            engine: NAME.to_string(),
            engines: vec![NAME.to_string()],
            ..SearchResult::default()
        }
    }
}

/// POST body for Tavily search
#[derive(Debug, Serialize)]
struct TavilyRequest {
    query: String,
    search_depth: SearchDepth,
    max_results: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_raw_content: bool,
}

// Tavily API response types
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    raw_content: Option<String>,
}

#[async_trait]
impl SearchBackend for TavilyBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn is_available(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>, BackendError> {
        if !self.is_available() {
            return Err(BackendError::unavailable(NAME, "Tavily API key not configured"));
        }

        // Tavily has no pagination; everything comes back on the first page
        if options.page_no > 1 {
            tracing::debug!(page = options.page_no, "tavily has no further pages");
            return Ok(Vec::new());
        }

        tracing::debug!(
            query = %options.query,
            depth = self.config.search_depth.as_str(),
            "performing tavily search"
        );

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request(options))
            .send()
            .await
            .map_err(|e| http::transport_error(NAME, e))?;

        let parsed: TavilyResponse = http::read_json(NAME, response).await?;

        let results: Vec<SearchResult> = parsed
            .results
            .into_iter()
            .map(|r| self.convert(r))
            .collect();

        tracing::debug!(result_count = results.len(), "tavily search completed");

        Ok(results)
    }
}
