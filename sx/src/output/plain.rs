//! Uncolored output
//!
//! Used whenever stdout is not a terminal, for `--output` files, and with
//! `--nocolor`. Warnings and errors keep a text label instead of a color.

use std::io::{self, Write};

use super::format::{page_lines, Style};
use super::{OutputEvent, OutputWriter, ResultPage};

#[derive(Debug, Default)]
pub struct PlainOutput;

impl PlainOutput {
    pub fn new() -> Self {
        Self
    }

    /// Result page lines exactly as they are written to a file
    pub fn render_page(page: &ResultPage) -> Vec<String> {
        page_lines(page, &|_: Style, text: &str| text.to_string())
    }
}

impl OutputWriter for PlainOutput {
    fn write(&self, event: OutputEvent) {
        match event {
            OutputEvent::Results(page) => {
                let mut stdout = io::stdout().lock();
                for line in Self::render_page(&page) {
                    let _ = writeln!(stdout, "{}", line);
                }
            }
            OutputEvent::Text(text) | OutputEvent::Json(text) | OutputEvent::Status(text) => {
                println!("{}", text)
            }
            OutputEvent::Prompt(prompt) => {
                print!("{}", prompt);
                let _ = io::stdout().flush();
            }
            OutputEvent::Error(msg) => eprintln!("Error: {}", msg),
            OutputEvent::Warning(msg) => eprintln!("Warning: {}", msg),
            OutputEvent::System(msg) => eprintln!("{}", msg),
            OutputEvent::NewLine => println!(),
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}
