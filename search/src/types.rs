//! Common types for search requests and results
//!
//! These types are shared by every search backend. Option values that come
//! from users (categories, time ranges, safe-search levels) are parsed into
//! enums here, once, so a backend never sees an unvalidated token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::InvalidOption;

/// A single search result from any backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// The URL of the result
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Snippet or full content, depending on the backend
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// The engine that produced the result
    #[serde(default, deserialize_with = "null_as_default")]
    pub engine: String,
    /// All upstream engines that returned this result
    #[serde(default, deserialize_with = "null_as_default")]
    pub engines: Vec<String>,
    /// Result category as reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Category-specific attributes
    #[serde(flatten)]
    pub attributes: ResultAttributes,
}

impl SearchResult {
    /// Title to show to users; never empty
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "No title"
        } else {
            &self.title
        }
    }

    /// Whether the result can be opened or copied
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Optional attributes that only some categories carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultAttributes {
    #[serde(rename = "publishedDate", default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Media length; SearXNG sends either seconds or a formatted string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Geo address (map results)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnetlink: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub seed: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub leech: Option<u64>,
    /// Torrent engines send either a byte count or a formatted size
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub filesize: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Torrent engines disagree on whether counts are numbers or strings
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Strings pass through and numbers are rendered; anything else is dropped
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// Categories
// ============================================================================

/// Result category partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    General,
    News,
    Videos,
    Images,
    Music,
    Map,
    Science,
    It,
    Files,
    SocialMedia,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::General,
        Category::News,
        Category::Videos,
        Category::Images,
        Category::Music,
        Category::Map,
        Category::Science,
        Category::It,
        Category::Files,
        Category::SocialMedia,
    ];

    /// Canonical wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::News => "news",
            Category::Videos => "videos",
            Category::Images => "images",
            Category::Music => "music",
            Category::Map => "map",
            Category::Science => "science",
            Category::It => "it",
            Category::Files => "files",
            Category::SocialMedia => "social media",
        }
    }

    /// Comma-separated list of supported categories, for messages
    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_category(s.trim());
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| InvalidOption::Category {
                value: s.to_string(),
                supported: Self::supported(),
            })
    }
}

/// Map category aliases to their canonical spelling.
///
/// Unrecognized values are returned unchanged, so this is idempotent.
pub fn normalize_category(category: &str) -> String {
    match category {
        "social+media" | "social-media" | "social_media" | "socialmedia" => {
            "social media".to_string()
        }
        other => other.to_string(),
    }
}

// ============================================================================
// Time ranges
// ============================================================================

/// Time range filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }

    /// Brave `freshness` parameter value
    pub fn brave_freshness(&self) -> &'static str {
        match self {
            TimeRange::Day => "pd",
            TimeRange::Week => "pw",
            TimeRange::Month => "pm",
            TimeRange::Year => "py",
        }
    }

    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match expand_time_range(s.trim()) {
            "day" => Ok(TimeRange::Day),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            _ => Err(InvalidOption::TimeRange {
                value: s.to_string(),
                supported: Self::supported(),
            }),
        }
    }
}

/// Expand single-letter time range shorthands. Anything else passes through.
pub fn expand_time_range(time_range: &str) -> &str {
    match time_range {
        "d" => "day",
        "w" => "week",
        "m" => "month",
        "y" => "year",
        other => other,
    }
}

// ============================================================================
// Safe search
// ============================================================================

/// Three-tier content filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeSearch {
    None,
    Moderate,
    Strict,
}

impl SafeSearch {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeSearch::None => "none",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Strict => "strict",
        }
    }

    /// SearXNG integer level
    pub fn searxng_level(&self) -> u8 {
        match self {
            SafeSearch::None => 0,
            SafeSearch::Moderate => 1,
            SafeSearch::Strict => 2,
        }
    }
}

impl fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafeSearch {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(SafeSearch::None),
            "moderate" => Ok(SafeSearch::Moderate),
            "strict" => Ok(SafeSearch::Strict),
            _ => Err(InvalidOption::SafeSearch(s.to_string())),
        }
    }
}

// ============================================================================
// Search options
// ============================================================================

/// Parameters for one search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Query text, without any `site:` prefix
    pub query: String,
    pub categories: Vec<Category>,
    /// SearXNG engine hints (not to be confused with search backends)
    pub engines: Vec<String>,
    pub language: Option<String>,
    pub time_range: Option<TimeRange>,
    /// Restrict results to one domain
    pub site: Option<String>,
    pub safe_search: Option<SafeSearch>,
    /// 1-based page number
    pub page_no: u32,
    /// Requested results per page (0 = backend default)
    pub num_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            categories: Vec::new(),
            engines: Vec::new(),
            language: None,
            time_range: None,
            site: None,
            safe_search: None,
            page_no: 1,
            num_results: 0,
        }
    }
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Query text with the `site:` operator applied, for backends that
    /// filter by site through the query itself
    pub fn query_with_site(&self) -> String {
        match self.site.as_deref().map(str::trim) {
            Some(site) if !site.is_empty() => format!("site:{} {}", site, self.query),
            _ => self.query.clone(),
        }
    }

    /// Result count clamped to the 1..=20 window Brave and Tavily accept
    pub fn clamped_count(&self) -> usize {
        match self.num_results {
            n @ 1..=20 => n,
            _ => 10,
        }
    }
}
