//! sx search library
//!
//! Pluggable web search backends with ordered primary/fallback dispatch.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use sx_search::{BackendManager, SearchOptions};
//! use sx_search::backends::brave::BraveBackend;
//!
//! let mut manager = BackendManager::new();
//! manager.register(Arc::new(BraveBackend::new(config.brave, timeout)?));
//! manager.set_primary("brave")?;
//!
//! let (results, backend) = manager.search(&SearchOptions::new("rust")).await?;
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod http;
pub mod manager;
pub mod types;

// Re-export the dispatch surface
pub use backends::SearchBackend;
pub use error::{BackendError, DispatchError, ErrorKind, FailedAttempt, InvalidOption};
pub use manager::BackendManager;

// Re-export common types for direct API usage
pub use types::{
    expand_time_range, normalize_category, Category, SafeSearch, SearchOptions, SearchResult,
    TimeRange,
};
