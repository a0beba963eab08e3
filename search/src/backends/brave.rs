//! Brave backend
//!
//! Implements the SearchBackend trait using the Brave Search API.
//! See: https://api-dashboard.search.brave.com/app/documentation/web-search/get-started

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;

use super::SearchBackend;
use crate::config::BraveConfig;
use crate::error::BackendError;
use crate::http::{self, ClientOptions};
use crate::types::{SafeSearch, SearchOptions, SearchResult};

const NAME: &str = "brave";
const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";
const SEARCH_PATH: &str = "/res/v1/web/search";

/// Brave Search API backend
///
/// Free tier: 2000 requests/month.
/// Documentation: https://brave.com/search/api/
pub struct BraveBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl BraveBackend {
    pub fn new(config: BraveConfig, timeout: Duration) -> Result<Self, BackendError> {
        let client = http::build_client(NAME, &ClientOptions::with_timeout(timeout))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the backend at a different API host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_params(options: &SearchOptions) -> Vec<(&'static str, String)> {
        let count = options.clamped_count();

        let mut params = vec![("q", options.query.clone()), ("count", count.to_string())];

        // Brave paginates by result offset, not page number
        if options.page_no > 1 {
            let offset = (options.page_no as usize - 1) * count;
            params.push(("offset", offset.to_string()));
        }

        let safe_search = match options.safe_search {
            Some(SafeSearch::None) => "off",
            Some(SafeSearch::Strict) => "strict",
            _ => "moderate",
        };
        params.push(("safesearch", safe_search.to_string()));

        if let Some(site) = options.site.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("site", site.to_string()));
        }

        if let Some(time_range) = options.time_range {
            params.push(("freshness", time_range.brave_freshness().to_string()));
        }

        if let Some(language) = options.language.as_deref().filter(|l| !l.is_empty()) {
            params.push(("search_lang", language.to_string()));
        }

        params
    }
}

// Brave API response types
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
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    age: Option<String>,
}

impl From<BraveResult> for SearchResult {
    fn from(r: BraveResult) -> Self {
        let mut result = SearchResult {
            title: r.title,
            url: r.url,
            content: r.description,
            engine: NAME.to_string(),
            engines: vec![NAME.to_string()],
            ..SearchResult::default()
        };
        result.attributes.published_date = r.age;
        result
    }
}

#[async_trait]
impl SearchBackend for BraveBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>, BackendError> {
        if !self.is_available() {
            return Err(BackendError::unavailable(NAME, "Brave API key not configured"));
        }

        tracing::debug!(
            query = %options.query,
            page = options.page_no,
            "performing brave search"
        );

        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .header("X-Subscription-Token", &self.api_key)
            .header(header::ACCEPT, "application/json")
            .query(&Self::build_params(options))
            .send()
            .await
            .map_err(|e| http::transport_error(NAME, e))?;

        let parsed: BraveResponse = http::read_json(NAME, response).await?;

        let results: Vec<SearchResult> = parsed
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(SearchResult::from)
            .collect();

        tracing::debug!(result_count = results.len(), "brave search completed");

        Ok(results)
    }
}
