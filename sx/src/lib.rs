//! sx: web search from the command line
//!
//! SearXNG, Brave and Tavily backends with ordered fallback, an interactive
//! result browser, and search history.

pub mod app;
pub mod cli;
pub mod config;
pub mod history;
pub mod logging;
pub mod opener;
pub mod output;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
