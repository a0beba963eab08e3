//! Per-backend configuration
//!
//! These sections are embedded in the application config file; each backend
//! is constructed from its own section plus the shared request timeout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidOption;

/// Transport used for SearXNG requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl FromStr for HttpMethod {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            _ => Err(InvalidOption::HttpMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// SearXNG configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearxngConfig {
    /// SearXNG instance URL
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub http_method: HttpMethod,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub no_verify_ssl: bool,
    /// Do not send a User-Agent header
    #[serde(default)]
    pub no_user_agent: bool,
}

/// Brave Search API configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BraveConfig {
    #[serde(default)]
    pub api_key: String,
}

/// Tavily search depth; advanced costs two credits per call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

/// Tavily Search API configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TavilyConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub search_depth: SearchDepth,
    /// Return full extracted page text instead of the summary snippet
    #[serde(default)]
    pub include_raw_content: bool,
}
