//! Commands accepted at the interactive prompt
//!
//! Anything that is not a recognized command is a new search query.

/// One parsed line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Next,
    Previous,
    First,
    ToggleExpand,
    ToggleDebug,
    /// `r <range>` or `t <range>`, unvalidated
    TimeRange(String),
    /// `site:<domain>`; empty clears the filter
    Site(String),
    /// `c <n>`: show the URL of result `n`
    Copy(Option<usize>),
    /// `j <n>`: show result `n` as JSON
    Json(Option<usize>),
    /// Bare number: open result `n`
    Open(usize),
    Query(String),
    Empty,
}

/// Command reference as `(usage, description)` pairs
pub const HELP: &[(&str, &str)] = &[
    ("<query>", "Run a new search"),
    ("n / p / f", "Next, previous or first page of results"),
    ("<index>", "Open a result in the browser (1, 2, 3, ...)"),
    ("c <index>", "Show the URL of a result"),
    ("j <index>", "Show a result as JSON"),
    ("r <range>", "Change the time range (day, week, month, year); 't' works too"),
    ("site:<domain>", "Restrict results to one site; 'site:' alone clears it"),
    ("x", "Toggle showing result URLs"),
    ("d", "Toggle debug output"),
    ("?", "Show this help"),
    ("q", "Quit (also 'quit' or 'exit')"),
];

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        match input {
            "" => return Command::Empty,
            "q" | "quit" | "exit" => return Command::Quit,
            "?" | "h" | "help" => return Command::Help,
            "n" => return Command::Next,
            "p" => return Command::Previous,
            "f" => return Command::First,
            "x" => return Command::ToggleExpand,
            "d" => return Command::ToggleDebug,
            _ => {}
        }

        if let Some(range) = input
            .strip_prefix("r ")
            .or_else(|| input.strip_prefix("t "))
        {
            return Command::TimeRange(range.trim().to_string());
        }

        if let Some(site) = input.strip_prefix("site:") {
            return Command::Site(site.trim().to_string());
        }

        if let Some(index) = input.strip_prefix("c ") {
            return Command::Copy(index.trim().parse().ok());
        }

        if let Some(index) = input.strip_prefix("j ") {
            return Command::Json(index.trim().parse().ok());
        }

        if let Ok(index) = input.parse::<usize>() {
            return Command::Open(index);
        }

        Command::Query(input.to_string())
    }
}

/// Formatted command reference
pub fn help_text() -> String {
    let mut help = String::from("Commands:\n");
    for (usage, description) in HELP {
        help.push_str(&format!("  {:<14} {}\n", usage, description));
    }
    help
}
