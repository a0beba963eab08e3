//! Where search output goes
//!
//! The session and REPL emit [`OutputEvent`]s; an [`OutputWriter`] decides
//! how they look. [`TerminalOutput`] colors result pages for a terminal,
//! [`PlainOutput`] is used for pipes, files and `--nocolor`.

use std::io::IsTerminal;

use sx_search::SearchResult;

pub mod format;
mod plain;
mod terminal;

pub use plain::PlainOutput;
pub use terminal::TerminalOutput;

/// A window of results ready to display
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub query: String,
    /// Offset of the first result in the whole result list
    pub start_at: usize,
    pub results: Vec<SearchResult>,
    /// Show the full URL under each title
    pub expand: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    Text(String),
    Results(ResultPage),
    /// Pretty-printed JSON document
    Json(String),
    /// Printed without a trailing newline
    Prompt(String),
    Status(String),
    Error(String),
    Warning(String),
    /// Debug details, dimmed
    System(String),
    NewLine,
}

pub trait OutputWriter: Send + Sync {
    fn write(&self, event: OutputEvent);

    fn flush(&self);

    fn supports_colors(&self) -> bool {
        false
    }
}

/// Colors only when stdout is a terminal and `--nocolor` is off
pub fn default_output(no_color: bool) -> Box<dyn OutputWriter> {
    if !no_color && std::io::stdout().is_terminal() {
        Box::new(TerminalOutput::new())
    } else {
        Box::new(PlainOutput::new())
    }
}
