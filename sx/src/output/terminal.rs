//! Colored output for an interactive terminal
//!
//! Each [`Style`] of the result layout maps to a fixed set of ANSI codes.
//! Results, JSON and the prompt go to stdout; diagnostics go to stderr.

use std::io::{self, Write};

use super::format::{page_lines, Style};
use super::{OutputEvent, OutputWriter, ResultPage};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";

fn codes_for(style: Style) -> &'static [&'static str] {
    match style {
        Style::Query => &[BOLD],
        Style::Index => &[CYAN],
        Style::Title => &[BOLD, GREEN],
        Style::Domain => &[YELLOW],
        Style::Dim => &[GRAY],
    }
}

pub struct TerminalOutput {
    ansi: bool,
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self { ansi: true }
    }

    /// Same layout, no escape codes
    pub fn without_colors() -> Self {
        Self { ansi: false }
    }

    fn wrap(&self, codes: &[&str], text: &str) -> String {
        if !self.ansi || text.is_empty() {
            return text.to_string();
        }
        format!("{}{}{}", codes.concat(), text, RESET)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        self.wrap(codes_for(style), text)
    }

    /// Result page lines with colors applied
    pub fn render_page(&self, page: &ResultPage) -> Vec<String> {
        page_lines(page, &|style: Style, text: &str| self.paint(style, text))
    }

    fn labeled(&self, label: &str, color: &str, msg: &str) -> String {
        format!("{} {}", self.wrap(&[BOLD, color], label), self.wrap(&[color], msg))
    }
}

impl OutputWriter for TerminalOutput {
    fn write(&self, event: OutputEvent) {
        match event {
            OutputEvent::Results(page) => {
                let mut stdout = io::stdout().lock();
                for line in self.render_page(&page) {
                    let _ = writeln!(stdout, "{}", line);
                }
            }
            OutputEvent::Text(text) | OutputEvent::Json(text) => println!("{}", text),
            OutputEvent::Status(msg) => println!("{}", self.wrap(&[GRAY], &msg)),
            OutputEvent::Prompt(prompt) => {
                print!("{}", self.wrap(&[BOLD], &prompt));
                let _ = io::stdout().flush();
            }
            OutputEvent::Error(msg) => eprintln!("{}", self.labeled("Error:", RED, &msg)),
            OutputEvent::Warning(msg) => eprintln!("{}", self.labeled("Warning:", YELLOW, &msg)),
            OutputEvent::System(msg) => eprintln!("{}", self.wrap(&[GRAY], &msg)),
            OutputEvent::NewLine => println!(),
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }

    fn supports_colors(&self) -> bool {
        self.ansi
    }
}
