//! SearXNG backend
//!
//! Implements the SearchBackend trait using a self-hosted SearXNG instance.
//! See: https://docs.searxng.org/dev/search_api.html

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use url::Url;

use super::SearchBackend;
use crate::config::{HttpMethod, SearxngConfig};
use crate::error::BackendError;
use crate::http::{self, ClientOptions};
use crate::types::{SearchOptions, SearchResult};

const NAME: &str = "searxng";

/// SearXNG backend
pub struct SearxngBackend {
    client: Client,
    config: SearxngConfig,
}

impl SearxngBackend {
    pub fn new(config: SearxngConfig, timeout: Duration) -> Result<Self, BackendError> {
        let options = ClientOptions {
            timeout,
            accept_invalid_certs: config.no_verify_ssl,
            user_agent: (!config.no_user_agent).then(|| http::USER_AGENT.to_string()),
        };
        let client = http::build_client(NAME, &options)?;

        Ok(Self { client, config })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.url.trim_end_matches('/'))
    }

    /// Build request parameters; the same set is sent as a query string
    /// (GET) or form body (POST)
    fn build_params(options: &SearchOptions) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", options.query_with_site()),
            ("format", "json".to_string()),
        ];

        if !options.categories.is_empty() {
            let categories: Vec<&str> = options.categories.iter().map(|c| c.as_str()).collect();
            params.push(("categories", categories.join(",")));
        }

        if !options.engines.is_empty() {
            params.push(("engines", options.engines.join(",")));
        }

        if let Some(language) = options.language.as_deref().filter(|l| !l.is_empty()) {
            params.push(("language", language.to_string()));
        }

        if let Some(safe_search) = options.safe_search {
            params.push(("safesearch", safe_search.searxng_level().to_string()));
        }

        if let Some(time_range) = options.time_range {
            params.push(("time_range", time_range.as_str().to_string()));
        }

        if options.page_no > 1 {
            params.push(("pageno", options.page_no.to_string()));
        }

        params
    }
}

// SearXNG API response types
#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[async_trait]
impl SearchBackend for SearxngBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn is_available(&self) -> bool {
        if self.config.url.trim().is_empty() {
            return false;
        }

        match Url::parse(&self.config.url) {
            Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
            Err(_) => false,
        }
    }

    async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>, BackendError> {
        if !self.is_available() {
            return Err(BackendError::unavailable(NAME, "SearXNG URL not configured"));
        }

        let params = Self::build_params(options);

        tracing::debug!(
            query = %options.query,
            page = options.page_no,
            method = %self.config.http_method,
            "performing searxng search"
        );

        let request = match self.config.http_method {
            HttpMethod::Get => self.client.get(self.search_url()).query(&params),
            HttpMethod::Post => self.client.post(self.search_url()).form(&params),
        };

        let mut request = request.header(header::ACCEPT, "application/json");

        if !self.config.username.is_empty() && !self.config.password.is_empty() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| http::transport_error(NAME, e))?;

        let parsed: SearxngResponse = http::read_json(NAME, response).await?;

        tracing::debug!(result_count = parsed.results.len(), "searxng search completed");

        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, SafeSearch, TimeRange};

    fn backend(url: &str) -> SearxngBackend {
        SearxngBackend::new(
            SearxngConfig {
                url: url.to_string(),
                ..SearxngConfig::default()
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_is_available() {
        assert!(backend("https://searx.example.org").is_available());
        assert!(backend("http://localhost:8080").is_available());
        assert!(!backend("").is_available());
        assert!(!backend("not a url").is_available());
        assert!(!backend("searx.example.org").is_available());
    }

    #[test]
    fn test_search_url_trims_trailing_slash() {
        assert_eq!(
            backend("https://searx.example.org/").search_url(),
            "https://searx.example.org/search"
        );
    }

    #[test]
    fn test_build_params_minimal() {
        let params = SearxngBackend::build_params(&SearchOptions::new("rust"));
        assert_eq!(param(&params, "q"), Some("rust"));
        assert_eq!(param(&params, "format"), Some("json"));
        assert_eq!(param(&params, "pageno"), None);
        assert_eq!(param(&params, "safesearch"), None);
    }

    #[test]
    fn test_build_params_full() {
        let options = SearchOptions {
            query: "rust".to_string(),
            categories: vec![Category::News, Category::SocialMedia],
            engines: vec!["duckduckgo".to_string(), "wikipedia".to_string()],
            language: Some("en".to_string()),
            time_range: Some(TimeRange::Week),
            site: Some("reddit.com".to_string()),
            safe_search: Some(SafeSearch::Strict),
            page_no: 3,
            num_results: 10,
        };

        let params = SearxngBackend::build_params(&options);
        assert_eq!(param(&params, "q"), Some("site:reddit.com rust"));
        assert_eq!(param(&params, "categories"), Some("news,social media"));
        assert_eq!(param(&params, "engines"), Some("duckduckgo,wikipedia"));
        assert_eq!(param(&params, "language"), Some("en"));
        assert_eq!(param(&params, "safesearch"), Some("2"));
        assert_eq!(param(&params, "time_range"), Some("week"));
        assert_eq!(param(&params, "pageno"), Some("3"));
    }

    #[tokio::test]
    async fn test_search_unavailable_fails_fast() {
        let err = backend("").search(&SearchOptions::new("rust")).await.unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Unavailable);
        assert_eq!(err.backend, "searxng");
    }
}
