//! Test doubles shared by the unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sx_search::{BackendError, SearchBackend, SearchOptions, SearchResult};

use crate::opener::UrlOpener;
use crate::output::{OutputEvent, OutputWriter};

/// Mock output writer for testing
pub struct MockOutput {
    events: Arc<Mutex<Vec<OutputEvent>>>,
}

impl MockOutput {
    pub fn new() -> (Self, Arc<Mutex<Vec<OutputEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: events.clone(),
            },
            events,
        )
    }
}

impl OutputWriter for MockOutput {
    fn write(&self, event: OutputEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn flush(&self) {}
}

/// Records opened URLs instead of launching a browser
#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Backend that answers page `n` with the `n`th scripted page and records
/// every request
pub struct ScriptedBackend {
    pages: Vec<Vec<SearchResult>>,
    fail: bool,
    calls: Mutex<Vec<SearchOptions>>,
}

impl ScriptedBackend {
    pub fn new(pages: Vec<Vec<SearchResult>>) -> Self {
        Self {
            pages,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<SearchOptions> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>, BackendError> {
        self.calls.lock().unwrap().push(options.clone());

        if self.fail {
            return Err(BackendError::network("scripted", "connection refused"));
        }

        let index = (options.page_no as usize).saturating_sub(1);
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// `count` results titled `Result 1..=count`
pub fn numbered_results(count: usize) -> Vec<SearchResult> {
    (1..=count)
        .map(|i| SearchResult {
            title: format!("Result {}", i),
            url: format!("https://example.com/{}", i),
            content: format!("Snippet {}", i),
            engine: "scripted".to_string(),
            ..SearchResult::default()
        })
        .collect()
}
