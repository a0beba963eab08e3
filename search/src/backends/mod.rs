//! Search backend implementations
//!
//! This module provides a trait-based abstraction for search backends.
//! Currently supports SearXNG (self-hosted meta-search engine), the Brave
//! Search API and the Tavily Search API.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{SearchOptions, SearchResult};

pub mod brave;
pub mod searxng;
pub mod tavily;

pub use brave::BraveBackend;
pub use searxng::SearxngBackend;
pub use tavily::TavilyBackend;

/// Trait for search backends
///
/// All search backends must implement this trait so the
/// [`BackendManager`](crate::BackendManager) can dispatch to them
/// interchangeably. Implementations never retry: fallback is the manager's
/// job.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Stable lowercase identifier, used as the registry key
    fn name(&self) -> &str;

    /// Check if this backend has enough configuration to attempt a call.
    ///
    /// Must not perform I/O.
    fn is_available(&self) -> bool;

    /// Perform one search request and map the response into [`SearchResult`]s
    async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>, BackendError>;
}
