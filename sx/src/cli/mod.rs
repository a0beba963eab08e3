//! CLI module
//!
//! This module provides:
//! - CLI argument definitions (args)
//! - Commands accepted at the interactive prompt (commands)
//! - The interactive result browser (repl)

pub mod args;
pub mod commands;
pub mod repl;

pub use args::{Cli, Commands, HistoryAction};
pub use commands::Command;
pub use repl::{Repl, ReplConfig, ReplState};
