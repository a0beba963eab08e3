//! Backend contract tests
//!
//! These tests verify the exact HTTP format each backend speaks against a
//! mock server: request shape, response parsing, and the mapping of error
//! statuses onto error kinds.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sx_search::backends::{BraveBackend, SearchBackend, SearxngBackend, TavilyBackend};
use sx_search::config::{BraveConfig, HttpMethod, SearxngConfig, TavilyConfig};
use sx_search::{
    BackendManager, Category, ErrorKind, SafeSearch, SearchOptions, TimeRange,
};
use wiremock::matchers::{
    basic_auth, bearer_token, body_partial_json, body_string_contains, header, method, path,
    query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn searxng(server: &MockServer, config: SearxngConfig) -> SearxngBackend {
    SearxngBackend::new(
        SearxngConfig {
            url: server.uri(),
            ..config
        },
        TIMEOUT,
    )
    .unwrap()
}

fn brave(server: &MockServer) -> BraveBackend {
    BraveBackend::new(
        BraveConfig {
            api_key: "brave-key".to_string(),
        },
        TIMEOUT,
    )
    .unwrap()
    .with_base_url(server.uri())
}

fn tavily(server: &MockServer, config: TavilyConfig) -> TavilyBackend {
    TavilyBackend::new(
        TavilyConfig {
            api_key: "tvly-key".to_string(),
            ..config
        },
        TIMEOUT,
    )
    .unwrap()
    .with_base_url(server.uri())
}

// ────────────────────────────────────────────────────────────────────────────
// SearXNG
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_searxng_get_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "site:docs.rs serde"))
        .and(query_param("format", "json"))
        .and(query_param("pageno", "2"))
        .and(query_param("safesearch", "0"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "serde",
            "results": [{
                "title": "serde - Rust",
                "url": "https://docs.rs/serde",
                "content": "A generic serialization framework",
                "engine": "duckduckgo",
                "engines": ["duckduckgo", "bing"],
                "category": "general",
                "publishedDate": null,
                "seed": "12"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = searxng(&mock_server, SearxngConfig::default());
    let mut options = SearchOptions::new("serde");
    options.site = Some("docs.rs".to_string());
    options.page_no = 2;
    options.safe_search = Some(SafeSearch::None);

    let results = backend.search(&options).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "https://docs.rs/serde");
    assert_eq!(results[0].engines, vec!["duckduckgo", "bing"]);
    assert_eq!(results[0].category.as_deref(), Some("general"));
    assert_eq!(results[0].attributes.seed, Some(12));
}

#[tokio::test]
async fn test_searxng_first_page_omits_pageno() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param_is_missing("pageno"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = searxng(&mock_server, SearxngConfig::default());
    let results = backend.search(&SearchOptions::new("rust")).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_searxng_post_form_with_basic_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(basic_auth("alice", "secret"))
        .and(body_string_contains("q=rust"))
        .and(body_string_contains("format=json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Rust", "url": "https://www.rust-lang.org"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = searxng(
        &mock_server,
        SearxngConfig {
            username: "alice".to_string(),
            password: "secret".to_string(),
            http_method: HttpMethod::Post,
            ..SearxngConfig::default()
        },
    );

    let results = backend.search(&SearchOptions::new("rust")).await.unwrap();
    assert_eq!(results[0].title, "Rust");
}

#[tokio::test]
async fn test_searxng_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let backend = searxng(&mock_server, SearxngConfig::default());
    let err = backend.search(&SearchOptions::new("rust")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidResponse);
    assert_eq!(err.backend, "searxng");
}

#[tokio::test]
async fn test_searxng_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let backend = searxng(&mock_server, SearxngConfig::default());
    let err = backend.search(&SearchOptions::new("rust")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.status, Some(503));
    assert!(err.to_string().starts_with("searxng backend: HTTP 503"));
}

#[tokio::test]
async fn test_searxng_numeric_filesize() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("categories", "files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "title": "ubuntu-24.04.iso",
                "url": "https://torrents.example/ubuntu",
                "category": "files",
                "filesize": 12345,
                "seed": 40
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = searxng(&mock_server, SearxngConfig::default());
    let mut options = SearchOptions::new("ubuntu");
    options.categories = vec![Category::Files];

    let results = backend.search(&options).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].attributes.filesize.as_deref(), Some("12345"));
    assert_eq!(results[0].attributes.seed, Some(40));
}

#[tokio::test]
async fn test_searxng_connection_refused() {
    let backend = SearxngBackend::new(
        SearxngConfig {
            url: "http://127.0.0.1:9".to_string(),
            ..SearxngConfig::default()
        },
        TIMEOUT,
    )
    .unwrap();

    let err = backend.search(&SearchOptions::new("rust")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.backend, "searxng");
    assert_eq!(err.status, None);
}

#[tokio::test]
async fn test_searxng_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let backend = SearxngBackend::new(
        SearxngConfig {
            url: mock_server.uri(),
            ..SearxngConfig::default()
        },
        Duration::from_millis(300),
    )
    .unwrap();

    let err = backend.search(&SearchOptions::new("rust")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(err.message.starts_with("request timed out"));
}

// ────────────────────────────────────────────────────────────────────────────
// Brave
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_brave_request_and_mapping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(header("x-subscription-token", "brave-key"))
        .and(query_param("q", "tokio"))
        .and(query_param("count", "5"))
        .and(query_param("offset", "5"))
        .and(query_param("freshness", "pw"))
        .and(query_param("safesearch", "strict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "search",
            "web": {
                "results": [{
                    "title": "Tokio",
                    "url": "https://tokio.rs",
                    "description": "An asynchronous runtime",
                    "age": "2 days ago"
                }]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut options = SearchOptions::new("tokio");
    options.num_results = 5;
    options.page_no = 2;
    options.time_range = Some(TimeRange::Week);
    options.safe_search = Some(SafeSearch::Strict);

    let results = brave(&mock_server).search(&options).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "An asynchronous runtime");
    assert_eq!(results[0].engine, "brave");
    assert_eq!(results[0].engines, vec!["brave"]);
    assert_eq!(results[0].attributes.published_date.as_deref(), Some("2 days ago"));
}

#[tokio::test]
async fn test_brave_missing_web_section() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "search"})))
        .mount(&mock_server)
        .await;

    let results = brave(&mock_server)
        .search(&SearchOptions::new("nothing"))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_brave_auth_and_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "unauthorized"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("q", "limited"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&mock_server)
        .await;

    let backend = brave(&mock_server);

    let err = backend
        .search(&SearchOptions::new("unauthorized"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.status, Some(401));

    let err = backend
        .search(&SearchOptions::new("limited"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimit);
    assert!(err.message.contains("quota exceeded"));
}

// ────────────────────────────────────────────────────────────────────────────
// Tavily
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tavily_request_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(bearer_token("tvly-key"))
        .and(body_partial_json(json!({
            "query": "site:rust-lang.org editions",
            "search_depth": "advanced",
            "max_results": 3,
            "include_raw_content": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "site:rust-lang.org editions",
            "results": [
                {
                    "title": "Editions",
                    "url": "https://doc.rust-lang.org/edition-guide/",
                    "content": "short",
                    "raw_content": "full edition guide text",
                    "score": 0.9
                },
                {
                    "title": "Rust 2024",
                    "url": "https://blog.rust-lang.org/",
                    "content": "blog post",
                    "raw_content": null,
                    "score": 0.7
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = tavily(
        &mock_server,
        TavilyConfig {
            search_depth: sx_search::config::SearchDepth::Advanced,
            include_raw_content: true,
            ..TavilyConfig::default()
        },
    );

    let mut options = SearchOptions::new("editions");
    options.site = Some("rust-lang.org".to_string());
    options.num_results = 3;

    let results = backend.search(&options).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].content, "full edition guide text");
    assert_eq!(results[1].content, "blog post");
    assert_eq!(results[1].engine, "tavily");
}

#[tokio::test]
async fn test_tavily_forbidden() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "bad key"})))
        .mount(&mock_server)
        .await;

    let err = tavily(&mock_server, TavilyConfig::default())
        .search(&SearchOptions::new("rust"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Auth);
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback across real backends
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fallback_to_tavily_when_searxng_down() {
    let searxng_server = MockServer::start().await;
    let tavily_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&searxng_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"title": "one", "url": "https://one.example", "content": "1"},
                {"title": "two", "url": "https://two.example", "content": "2"}
            ]
        })))
        .expect(1)
        .mount(&tavily_server)
        .await;

    let mut manager = BackendManager::new();
    manager.register(Arc::new(searxng(&searxng_server, SearxngConfig::default())));
    manager.register(Arc::new(
        BraveBackend::new(BraveConfig::default(), TIMEOUT).unwrap(),
    ));
    manager.register(Arc::new(tavily(&tavily_server, TavilyConfig::default())));
    manager.set_primary("searxng").unwrap();
    manager.set_fallbacks(&["brave", "tavily"]).unwrap();

    let (results, name) = manager.search(&SearchOptions::new("rust")).await.unwrap();
    assert_eq!(name, "tavily");
    assert_eq!(results.len(), 2);
}
