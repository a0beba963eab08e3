//! Interactive result browser
//!
//! The REPL is a small state machine over a [`Session`]: every input line is
//! parsed into a [`Command`], applied, and the loop either keeps showing the
//! current page, fetches more results, or terminates. Input comes from any
//! `BufRead`, so tests drive it with scripted lines.

use std::io::BufRead;

use sx_search::{DispatchError, TimeRange};

use super::commands::{help_text, Command};
use crate::history::History;
use crate::opener::UrlOpener;
use crate::output::format::results_json;
use crate::output::{OutputEvent, OutputWriter, ResultPage};
use crate::session::Session;

pub const PROMPT: &str = "sx (? for help): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplState {
    /// Showing results and waiting for input
    DisplayingPage,
    /// The session needs to grow or refetch before the next page is shown
    AwaitingFetch,
    Terminated,
}

/// Display settings for the REPL
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Results per page; 0 shows everything fetched
    pub page_size: usize,
    pub expand: bool,
    pub debug: bool,
    /// Use the clean JSON form for `j <n>`
    pub clean_json: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            expand: false,
            debug: false,
            clean_json: false,
        }
    }
}

/// Interactive REPL
pub struct Repl<'a> {
    session: Session<'a>,
    output: &'a dyn OutputWriter,
    opener: &'a dyn UrlOpener,
    history: Option<&'a History>,
    config: ReplConfig,
    state: ReplState,
}

impl<'a> Repl<'a> {
    /// Create a new REPL
    pub fn new(
        session: Session<'a>,
        output: &'a dyn OutputWriter,
        opener: &'a dyn UrlOpener,
    ) -> Self {
        Self {
            session,
            output,
            opener,
            history: None,
            config: ReplConfig::default(),
            state: ReplState::DisplayingPage,
        }
    }

    /// Configure the REPL
    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Record new queries typed at the prompt
    pub fn with_history(mut self, history: Option<&'a History>) -> Self {
        self.history = history;
        self
    }

    pub fn state(&self) -> ReplState {
        self.state
    }

    pub fn session(&self) -> &Session<'a> {
        &self.session
    }

    /// Read lines until the user quits or input ends
    pub async fn run<R: BufRead>(&mut self, mut reader: R) -> anyhow::Result<()> {
        let mut line = String::new();

        while self.state != ReplState::Terminated {
            self.output.write(OutputEvent::Prompt(PROMPT.to_string()));

            line.clear();
            if reader.read_line(&mut line)? == 0 {
                self.output.write(OutputEvent::NewLine);
                break;
            }

            // Already reported to the user by step()
            if let Err(err) = self.step(&line).await {
                tracing::debug!(error = %err, "interactive search failed");
            }
        }

        self.output.flush();
        Ok(())
    }

    /// Apply one line of input
    pub async fn step(&mut self, line: &str) -> Result<ReplState, DispatchError> {
        match Command::parse(line) {
            Command::Empty => {}

            Command::Quit => {
                self.state = ReplState::Terminated;
            }

            Command::Help => {
                self.output.write(OutputEvent::Text(help_text()));
            }

            Command::Next => self.next_page().await?,

            Command::Previous => {
                let start_at = self.session.start_at().saturating_sub(self.page_step());
                self.session.set_start_at(start_at);
                self.render();
            }

            Command::First => {
                self.session.set_start_at(0);
                self.render();
            }

            Command::ToggleExpand => {
                self.config.expand = !self.config.expand;
                self.render();
            }

            Command::ToggleDebug => {
                self.config.debug = !self.config.debug;
                let state = if self.config.debug { "enabled" } else { "disabled" };
                self.output
                    .write(OutputEvent::Status(format!("Debug mode {}", state)));
            }

            Command::TimeRange(value) => match value.parse::<TimeRange>() {
                Ok(time_range) => {
                    self.session.set_time_range(Some(time_range));
                    self.refresh().await?;
                }
                Err(err) => self.output.write(OutputEvent::Warning(err.to_string())),
            },

            Command::Site(site) => {
                if site.is_empty() {
                    self.session.set_site(None);
                    self.refresh().await?;
                } else if site.chars().any(char::is_whitespace) {
                    self.output
                        .write(OutputEvent::Warning(format!("Invalid site '{}'", site)));
                } else {
                    self.session.set_site(Some(site));
                    self.refresh().await?;
                }
            }

            Command::Copy(index) => match self.indexed_url(index) {
                Some(url) => self.output.write(OutputEvent::Text(format!("URL: {}", url))),
                None => self.invalid_index(),
            },

            Command::Json(index) => self.show_json(index),

            Command::Open(index) => match self.indexed_url(Some(index)) {
                Some(url) => {
                    if let Err(err) = self.opener.open(&url) {
                        self.output
                            .write(OutputEvent::Error(format!("Error opening URL: {:#}", err)));
                    }
                }
                None => self.invalid_index(),
            },

            Command::Query(query) => {
                self.session.set_query(query.as_str());
                if let Some(history) = self.history {
                    if let Err(err) = history.append(&query) {
                        tracing::warn!(error = %err, "failed to record search history");
                    }
                }
                self.refresh().await?;
            }
        }

        Ok(self.state)
    }

    /// Fetch what the current page needs and show it
    ///
    /// A failed fetch is reported as an error event and also returned.
    pub async fn refresh(&mut self) -> Result<(), DispatchError> {
        self.state = ReplState::AwaitingFetch;
        let start_at = self.session.start_at();
        let result = self
            .session
            .ensure_results(start_at, self.config.page_size)
            .await;
        self.state = ReplState::DisplayingPage;

        if let Err(err) = result {
            self.output.write(OutputEvent::Error(err.to_string()));
            return Err(err);
        }

        self.render();
        Ok(())
    }

    /// Show the current page
    pub fn render(&self) {
        if self.session.results().is_empty() {
            self.output
                .write(OutputEvent::Status("No results found.".to_string()));
        } else {
            self.output.write(OutputEvent::Results(ResultPage {
                query: self.session.query().to_string(),
                start_at: self.session.start_at(),
                results: self.session.window(self.config.page_size).to_vec(),
                expand: self.config.expand,
            }));
        }

        if self.config.debug {
            self.output.write(OutputEvent::System(format!(
                "backend: {}, next page: {}, buffered results: {}",
                self.session.used_backend().unwrap_or("none"),
                self.session.page_no(),
                self.session.results().len()
            )));
        }
    }

    async fn next_page(&mut self) -> Result<(), DispatchError> {
        let previous = self.session.start_at();
        let start_at = previous + self.page_step();

        if start_at < self.session.results().len() {
            self.session.set_start_at(start_at);
            self.render();
            return Ok(());
        }

        self.state = ReplState::AwaitingFetch;
        let result = self
            .session
            .ensure_results(start_at, self.config.page_size.max(1))
            .await;
        self.state = ReplState::DisplayingPage;

        if let Err(err) = result {
            self.output.write(OutputEvent::Error(err.to_string()));
            return Err(err);
        }

        if start_at < self.session.results().len() {
            self.session.set_start_at(start_at);
            self.render();
        } else {
            self.output
                .write(OutputEvent::Status("No more results".to_string()));
        }
        Ok(())
    }

    fn page_step(&self) -> usize {
        match self.config.page_size {
            0 => self.session.results().len().max(1),
            n => n,
        }
    }

    fn indexed_url(&self, index: Option<usize>) -> Option<String> {
        index
            .and_then(|i| self.session.result(i))
            .map(|r| r.url.clone())
    }

    fn show_json(&self, index: Option<usize>) {
        let Some(result) = index.and_then(|i| self.session.result(i)) else {
            self.invalid_index();
            return;
        };

        match results_json(
            self.session.query(),
            std::slice::from_ref(result),
            self.config.clean_json,
        ) {
            Ok(json) => self.output.write(OutputEvent::Json(json)),
            Err(err) => self
                .output
                .write(OutputEvent::Error(format!("Error formatting JSON: {}", err))),
        }
    }

    fn invalid_index(&self) {
        self.output
            .write(OutputEvent::Warning("Invalid index specified.".to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{numbered_results, MockOutput, RecordingOpener, ScriptedBackend};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use sx_search::{BackendManager, SearchOptions};

    type Events = Arc<Mutex<Vec<OutputEvent>>>;

    fn manager_with(backend: Arc<ScriptedBackend>) -> BackendManager {
        let mut manager = BackendManager::new();
        manager.register(backend);
        manager.set_primary("scripted").unwrap();
        manager
    }

    fn page_size(page_size: usize) -> ReplConfig {
        ReplConfig {
            page_size,
            ..ReplConfig::default()
        }
    }

    fn warnings(events: &Events) -> Vec<String> {
        events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Warning(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    fn statuses(events: &Events) -> Vec<String> {
        events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Status(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    fn last_page(events: &Events) -> Option<ResultPage> {
        events.lock().unwrap().iter().rev().find_map(|e| match e {
            OutputEvent::Results(page) => Some(page.clone()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn test_invalid_time_range_keeps_state() {
        let backend = Arc::new(ScriptedBackend::new(vec![numbered_results(5)]));
        let manager = manager_with(backend.clone());
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("golang"));
        let mut repl = Repl::new(session, &output, &opener).with_config(page_size(5));

        repl.refresh().await.unwrap();
        let state = repl.step("t week2").await.unwrap();

        assert_eq!(state, ReplState::DisplayingPage);
        assert_eq!(
            warnings(&events),
            vec!["Invalid time range 'week2'. Use: day, week, month, year"]
        );
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(repl.session().results().len(), 5);
        assert!(repl.session().options().time_range.is_none());
    }

    #[tokio::test]
    async fn test_time_range_resets_and_refetches() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            numbered_results(5),
            numbered_results(5),
        ]));
        let manager = manager_with(backend.clone());
        let (output, _events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("golang"));
        let mut repl = Repl::new(session, &output, &opener).with_config(page_size(5));

        repl.refresh().await.unwrap();
        repl.step("n").await.unwrap();
        assert_eq!(repl.session().results().len(), 10);

        repl.step("r week").await.unwrap();

        let calls = backend.calls();
        let last = calls.last().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(last.time_range, Some(TimeRange::Week));
        assert_eq!(last.page_no, 1);
        assert_eq!(repl.session().results().len(), 5);
        assert_eq!(repl.session().start_at(), 0);
    }

    #[tokio::test]
    async fn test_next_grows_session() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            numbered_results(5),
            numbered_results(5),
        ]));
        let manager = manager_with(backend.clone());
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("golang"));
        let mut repl = Repl::new(session, &output, &opener).with_config(page_size(5));

        repl.refresh().await.unwrap();
        assert_eq!(backend.calls().len(), 1);

        repl.step("n").await.unwrap();
        let page = last_page(&events).unwrap();
        assert_eq!(page.start_at, 5);
        assert_eq!(page.results.len(), 5);
        assert_eq!(backend.calls().len(), 2);

        repl.step("p").await.unwrap();
        assert_eq!(last_page(&events).unwrap().start_at, 0);
        repl.step("p").await.unwrap();
        assert_eq!(repl.session().start_at(), 0);
    }

    #[tokio::test]
    async fn test_next_past_end_reports_no_more() {
        let backend = Arc::new(ScriptedBackend::new(vec![numbered_results(3)]));
        let manager = manager_with(backend.clone());
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rare"));
        let mut repl = Repl::new(session, &output, &opener).with_config(page_size(5));

        repl.refresh().await.unwrap();
        assert!(repl.session().is_exhausted());

        repl.step("n").await.unwrap();
        assert_eq!(statuses(&events), vec!["No more results"]);
        assert_eq!(repl.session().start_at(), 0);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_index_commands() {
        let backend = Arc::new(ScriptedBackend::new(vec![numbered_results(3)]));
        let manager = manager_with(backend);
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rust"));
        let mut repl = Repl::new(session, &output, &opener).with_config(page_size(3));

        repl.refresh().await.unwrap();
        repl.step("c 2").await.unwrap();
        repl.step("c 9").await.unwrap();
        repl.step("j x").await.unwrap();
        repl.step("3").await.unwrap();
        repl.step("0").await.unwrap();

        assert!(events
            .lock()
            .unwrap()
            .contains(&OutputEvent::Text("URL: https://example.com/2".to_string())));
        assert_eq!(warnings(&events).len(), 3);
        assert!(warnings(&events)
            .iter()
            .all(|w| w == "Invalid index specified."));
        assert_eq!(
            *opener.opened.lock().unwrap(),
            vec!["https://example.com/3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_json_command() {
        let backend = Arc::new(ScriptedBackend::new(vec![numbered_results(2)]));
        let manager = manager_with(backend);
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rust"));
        let mut repl = Repl::new(session, &output, &opener);

        repl.refresh().await.unwrap();
        repl.step("j 1").await.unwrap();

        let json = events
            .lock()
            .unwrap()
            .iter()
            .find_map(|e| match e {
                OutputEvent::Json(json) => Some(json.clone()),
                _ => None,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["query"], "rust");
        assert_eq!(value["results"][0]["title"], "Result 1");
    }

    #[tokio::test]
    async fn test_site_filter() {
        let backend = Arc::new(ScriptedBackend::new(vec![numbered_results(2)]));
        let manager = manager_with(backend.clone());
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rust"));
        let mut repl = Repl::new(session, &output, &opener);

        repl.step("site:docs .rs").await.unwrap();
        assert_eq!(warnings(&events), vec!["Invalid site 'docs .rs'"]);
        assert!(backend.calls().is_empty());

        repl.step("site:docs.rs").await.unwrap();
        assert_eq!(backend.calls()[0].site.as_deref(), Some("docs.rs"));

        repl.step("site:").await.unwrap();
        assert!(backend.calls().last().unwrap().site.is_none());
    }

    #[tokio::test]
    async fn test_new_query_recorded_in_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = History::new(dir.path().join("history"), 10);
        let backend = Arc::new(ScriptedBackend::new(vec![numbered_results(1)]));
        let manager = manager_with(backend.clone());
        let (output, _events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rust"));
        let mut repl = Repl::new(session, &output, &opener).with_history(Some(&history));

        repl.step("tokio select").await.unwrap();

        assert_eq!(repl.session().query(), "tokio select");
        assert_eq!(backend.calls()[0].query, "tokio select");
        let entries = history.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "tokio select");
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_loop_alive() {
        let backend = Arc::new(ScriptedBackend::failing());
        let manager = manager_with(backend);
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rust"));
        let mut repl = Repl::new(session, &output, &opener);

        let err = repl.step("rust").await.unwrap_err();

        assert!(matches!(err, DispatchError::AllFailed(_)));
        assert_eq!(repl.state(), ReplState::DisplayingPage);
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, OutputEvent::Error(msg) if msg.contains("scripted"))));
    }

    #[tokio::test]
    async fn test_empty_results_keep_loop_alive() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new()));
        let manager = manager_with(backend);
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("nothing"));
        let mut repl = Repl::new(session, &output, &opener);

        repl.refresh().await.unwrap();

        assert_eq!(repl.state(), ReplState::DisplayingPage);
        assert_eq!(statuses(&events), vec!["No results found."]);
    }

    #[tokio::test]
    async fn test_debug_toggle() {
        let backend = Arc::new(ScriptedBackend::new(vec![numbered_results(1)]));
        let manager = manager_with(backend);
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rust"));
        let mut repl = Repl::new(session, &output, &opener);

        repl.step("d").await.unwrap();
        repl.step("f").await.unwrap();
        repl.step("d").await.unwrap();

        assert_eq!(
            statuses(&events),
            vec!["Debug mode enabled", "No results found.", "Debug mode disabled"]
        );
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, OutputEvent::System(msg) if msg.starts_with("backend: none"))));
    }

    #[tokio::test]
    async fn test_run_scripted_input() {
        let backend = Arc::new(ScriptedBackend::new(vec![numbered_results(3)]));
        let manager = manager_with(backend);
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rust"));
        let mut repl = Repl::new(session, &output, &opener);

        repl.refresh().await.unwrap();
        repl.run(Cursor::new("?\n2\nq\nnever reached\n")).await.unwrap();

        assert_eq!(repl.state(), ReplState::Terminated);
        assert_eq!(
            *opener.opened.lock().unwrap(),
            vec!["https://example.com/2".to_string()]
        );
        let prompts = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, OutputEvent::Prompt(p) if p == PROMPT))
            .count();
        assert_eq!(prompts, 3);
    }

    #[tokio::test]
    async fn test_run_stops_at_eof() {
        let manager = BackendManager::new();
        let (output, events) = MockOutput::new();
        let opener = RecordingOpener::default();
        let session = Session::new(&manager, SearchOptions::new("rust"));
        let mut repl = Repl::new(session, &output, &opener);

        repl.run(Cursor::new("")).await.unwrap();

        assert_eq!(repl.state(), ReplState::DisplayingPage);
        assert_eq!(events.lock().unwrap().last(), Some(&OutputEvent::NewLine));
    }
}
